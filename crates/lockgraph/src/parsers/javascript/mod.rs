//! JavaScript package manager lockfile parsers.
//!
//! Each parser turns one package manager's lockfile text into a [`ParsedLockfile`](crate::ParsedLockfile)
//! through the shared [`LockfileParser`](crate::LockfileParser) trait. The implementations are
//! gated behind fine-grained Cargo features so consumers can opt into only the parsers they need.

#[cfg(feature = "parser-bun")]
pub mod bun;
#[cfg(feature = "parser-npm")]
pub mod npm;
#[cfg(feature = "parser-pnpm")]
pub mod pnpm;
#[cfg(feature = "parser-yarn")]
pub mod yarn;
#[cfg(feature = "parser-yarn")]
mod yarn_classic;
#[cfg(feature = "parser-yarn")]
mod yarn_modern;

#[cfg(feature = "parser-bun")]
pub use bun::BunLockfileParser;
#[cfg(feature = "parser-npm")]
pub use npm::NpmLockfileParser;
#[cfg(feature = "parser-pnpm")]
pub use pnpm::PnpmLockfileParser;
#[cfg(feature = "parser-yarn")]
pub use yarn::YarnLockfileParser;
