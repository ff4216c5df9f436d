//! Dependency graphs reconstructed from JavaScript package-manager lockfiles.
//!
//! This crate reads the lockfiles written by npm, Yarn (classic v1 and Berry),
//! pnpm and Bun and turns each of them into the same shape: a
//! [`ParsedLockfile`] holding one [`Package`] per installed package, with
//! dependency edges stored as [`PackageId`] indices into that arena. Cycles
//! are common in real lockfiles and are represented without any shared
//! ownership.
//!
//! # Example
//!
//! ```
//! use lockgraph::{DependencyKind, LockfileParser, NpmLockfileParser};
//!
//! let lock = r#"{
//!   "name": "app",
//!   "packages": {
//!     "": { "name": "app", "version": "1.0.0", "dependencies": { "a": "^1.0.0" } },
//!     "node_modules/a": { "version": "1.0.0" }
//!   }
//! }"#;
//!
//! let parsed = NpmLockfileParser.parse(lock, None).unwrap();
//! let a = parsed.find("a").unwrap();
//!
//! assert_eq!(parsed.root_package().name, "app");
//! assert_eq!(parsed.edges(parsed.root(), DependencyKind::Runtime), &[a]);
//! ```
//!
//! # Core Types
//!
//! - [`ParsedLockfile`] - The arena of packages plus the root id
//! - [`Package`] - One node with its four ordered edge lists
//! - [`PackageId`] - Index of a package within its lockfile
//! - [`DependencyKind`] - Runtime, dev, peer or optional
//! - [`LockfileBuilder`] - Incremental construction used by every parser
//!
//! # Dispatch
//!
//! [`parse`] and [`LockfileDispatcher`] pick a parser from a type name
//! (`npm`, `yarn`, `pnpm`, `bun`, `bun-binary`) or a lockfile file name:
//!
//! ```
//! use lockgraph::{LockfileType, PackageManager};
//!
//! let lock = "# yarn lockfile v1\n\n\"a@^1.0.0\":\n  version \"1.0.0\"\n";
//! let parsed = lockgraph::parse(lock, "frontend/yarn.lock", None).unwrap();
//!
//! assert_eq!(parsed.manager(), PackageManager::Yarn);
//! assert_eq!(LockfileType::from_type_or_file_name("bun.lockb"), Some(LockfileType::BunBinary));
//! ```
//!
//! The binary `bun.lockb` format is accepted only when a
//! [`BinaryLockfileDecoder`] is registered on the dispatcher.
//!
//! # Traversal
//!
//! [`traverse()`] walks the graph depth-first, calling a callback per
//! dependency kind. See the [`traverse`](mod@traverse) module.
//!
//! # Feature flags
//!
//! - `parsers-javascript` (default) - Enables every parser below
//! - `parser-npm` - `package-lock.json` and `npm-shrinkwrap.json`
//! - `parser-yarn` - `yarn.lock`, classic and Berry
//! - `parser-pnpm` - `pnpm-lock.yaml`
//! - `parser-bun` - `bun.lock`

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod core;
mod dispatch;
mod error;
pub mod parsers;
pub mod tokenizer;
pub mod traverse;

pub use core::{
    DependencyGraph, DependencyKind, LockfileBuilder, LockfileParser, Manifest, Package,
    PackageId, PackageManager, PackageRef, ParsedLockfile,
};
pub use dispatch::{BinaryLockfileDecoder, LockfileDispatcher, LockfileType, parse, parse_bytes};
pub use error::{Error, Result};

#[cfg(feature = "parser-bun")]
pub use parsers::javascript::BunLockfileParser;
#[cfg(feature = "parser-npm")]
pub use parsers::javascript::NpmLockfileParser;
#[cfg(feature = "parser-pnpm")]
pub use parsers::javascript::PnpmLockfileParser;
#[cfg(feature = "parser-yarn")]
pub use parsers::javascript::YarnLockfileParser;

pub use traverse::{Visit, Visitor, Walk, traverse};
