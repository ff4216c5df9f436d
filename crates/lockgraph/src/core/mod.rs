//! Core abstractions shared by every lockfile parser.
//!
//! - **Types** - package managers, dependency kinds, packages and manifests
//! - **Graph** - the [`ParsedLockfile`] arena and the [`LockfileBuilder`] used to fill it
//! - **Traits** - the [`LockfileParser`] interface each format implements

pub mod graph;
pub mod traits;
pub mod types;

pub use graph::{DependencyGraph, LockfileBuilder, PackageRef, ParsedLockfile};
pub use traits::LockfileParser;
pub use types::{DependencyKind, Manifest, Package, PackageId, PackageManager};
