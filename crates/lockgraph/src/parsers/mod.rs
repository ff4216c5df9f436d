//! Parser implementations for converting package-manager lockfiles into a [`ParsedLockfile`](crate::ParsedLockfile).
//!
//! ## Feature flags
//!
//! - `parsers-javascript`: Enables every JavaScript ecosystem parser (npm, yarn, pnpm, bun)
//! - `parser-npm`, `parser-yarn`, `parser-pnpm`, `parser-bun`: one parser each
//!
//! **Note:** A format whose parser is compiled out is still recognized by the
//! [`LockfileDispatcher`](crate::LockfileDispatcher), which then reports
//! [`Error::ParserDisabled`](crate::Error::ParserDisabled).

pub mod javascript;
