//! Depth-first walks over a parsed lockfile.
//!
//! A [`Visitor`] registers up to one callback per [`DependencyKind`]. Only the
//! kinds with a callback are followed: a visitor that only handles dev
//! dependencies never reaches anything behind a runtime edge.
//!
//! Shared packages are visited once per path that reaches them. A package that
//! is already an ancestor on the current path is neither reported nor entered
//! again, so cyclic graphs terminate.

use crate::core::graph::ParsedLockfile;
use crate::core::types::{DependencyKind, Package, PackageId};
use std::collections::HashSet;
use std::fmt;

/// What the walk should do after a callback returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Walk {
    /// Descend into the visited package.
    #[default]
    Continue,
    /// Do not descend into the visited package. Siblings are still visited.
    SkipChildren,
}

impl From<()> for Walk {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for Walk {
    /// `false` skips the children, mirroring a visitor that returns "stop here".
    fn from(descend: bool) -> Self {
        if descend {
            Self::Continue
        } else {
            Self::SkipChildren
        }
    }
}

/// One edge reported to a callback.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    /// The dependency being visited.
    pub id: PackageId,
    /// Its package data.
    pub package: &'a Package,
    /// The package declaring the dependency.
    pub parent: PackageId,
    /// The edge kind it was declared under.
    pub kind: DependencyKind,
    /// Ancestors from the start of the walk down to `parent`, inclusive.
    pub path: &'a [PackageId],
}

type Callback<'cb> = Box<dyn FnMut(&Visit<'_>) -> Walk + 'cb>;

/// Per-kind callbacks for [`traverse`].
///
/// ```
/// use lockgraph::traverse::{Visitor, Walk};
///
/// let mut runtime = Vec::new();
/// let visitor = Visitor::new().on_dependency(|visit| {
///     runtime.push(visit.package.name.clone());
///     Walk::Continue
/// });
/// # drop(visitor);
/// ```
#[derive(Default)]
pub struct Visitor<'cb> {
    callbacks: [Option<Callback<'cb>>; 4],
}

impl<'cb> Visitor<'cb> {
    /// A visitor with no callbacks; walking with it visits nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the callback for one kind, replacing any earlier one.
    ///
    /// The callback may return [`Walk`], `bool` (`false` skips the children)
    /// or `()`.
    #[must_use]
    pub fn on<R, F>(mut self, kind: DependencyKind, mut callback: F) -> Self
    where
        R: Into<Walk>,
        F: FnMut(&Visit<'_>) -> R + 'cb,
    {
        self.callbacks[slot(kind)] =
            Some(Box::new(move |visit: &Visit<'_>| callback(visit).into()));
        self
    }

    /// Registers the runtime (`dependencies`) callback.
    #[must_use]
    pub fn on_dependency<R, F>(self, callback: F) -> Self
    where
        R: Into<Walk>,
        F: FnMut(&Visit<'_>) -> R + 'cb,
    {
        self.on(DependencyKind::Runtime, callback)
    }

    /// Registers the `devDependencies` callback.
    #[must_use]
    pub fn on_dev_dependency<R, F>(self, callback: F) -> Self
    where
        R: Into<Walk>,
        F: FnMut(&Visit<'_>) -> R + 'cb,
    {
        self.on(DependencyKind::Dev, callback)
    }

    /// Registers the `peerDependencies` callback.
    #[must_use]
    pub fn on_peer_dependency<R, F>(self, callback: F) -> Self
    where
        R: Into<Walk>,
        F: FnMut(&Visit<'_>) -> R + 'cb,
    {
        self.on(DependencyKind::Peer, callback)
    }

    /// Registers the `optionalDependencies` callback.
    #[must_use]
    pub fn on_optional_dependency<R, F>(self, callback: F) -> Self
    where
        R: Into<Walk>,
        F: FnMut(&Visit<'_>) -> R + 'cb,
    {
        self.on(DependencyKind::Optional, callback)
    }

    /// Returns `true` if edges of this kind are followed.
    #[must_use]
    pub fn handles(&self, kind: DependencyKind) -> bool {
        self.callbacks[slot(kind)].is_some()
    }

    fn call(&mut self, visit: &Visit<'_>) -> Walk {
        self.callbacks[slot(visit.kind)]
            .as_mut()
            .map_or(Walk::SkipChildren, |callback| callback(visit))
    }
}

impl fmt::Debug for Visitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handled: Vec<_> = DependencyKind::ALL
            .into_iter()
            .filter(|kind| self.handles(*kind))
            .collect();
        f.debug_struct("Visitor").field("handles", &handled).finish()
    }
}

const fn slot(kind: DependencyKind) -> usize {
    match kind {
        DependencyKind::Runtime => 0,
        DependencyKind::Dev => 1,
        DependencyKind::Peer => 2,
        DependencyKind::Optional => 3,
    }
}

/// Walks the graph depth-first from `start`, calling the visitor's callbacks
/// for every followed edge.
///
/// Within one package, edges are visited kind by kind (runtime, dev, peer,
/// optional) and in declaration order inside each kind. An unknown `start`
/// visits nothing.
///
/// # Example
///
/// ```
/// use lockgraph::traverse::{traverse, Visitor};
///
/// let lock = r#"{"packages": {
///     "": {"name": "app", "dependencies": {"a": "1"}, "devDependencies": {"b": "1"}},
///     "node_modules/a": {"version": "1.0.0"},
///     "node_modules/b": {"version": "1.0.0"}
/// }}"#;
/// let parsed = lockgraph::parse(lock, "npm", None).unwrap();
///
/// let mut seen = Vec::new();
/// let mut visitor = Visitor::new().on_dev_dependency(|visit| seen.push(visit.package.name.clone()));
/// traverse(&parsed, parsed.root(), &mut visitor);
/// drop(visitor);
///
/// assert_eq!(seen, ["b"]);
/// ```
pub fn traverse(lockfile: &ParsedLockfile, start: PackageId, visitor: &mut Visitor<'_>) {
    if lockfile.package(start).is_none() {
        return;
    }
    let mut walker = Walker {
        lockfile,
        visitor,
        path: vec![start],
        on_path: HashSet::from([start]),
    };
    walker.walk(start);
}

struct Walker<'l, 'v, 'cb> {
    lockfile: &'l ParsedLockfile,
    visitor: &'v mut Visitor<'cb>,
    path: Vec<PackageId>,
    on_path: HashSet<PackageId>,
}

impl Walker<'_, '_, '_> {
    fn walk(&mut self, node: PackageId) {
        let lockfile = self.lockfile;
        let Some(package) = lockfile.package(node) else {
            return;
        };

        for kind in DependencyKind::ALL {
            if !self.visitor.handles(kind) {
                continue;
            }
            for &child in package.edges(kind) {
                if self.on_path.contains(&child) {
                    continue;
                }
                let Some(child_package) = lockfile.package(child) else {
                    continue;
                };

                let visit = Visit {
                    id: child,
                    package: child_package,
                    parent: node,
                    kind,
                    path: &self.path,
                };
                if self.visitor.call(&visit) == Walk::SkipChildren {
                    continue;
                }

                self.path.push(child);
                self.on_path.insert(child);
                self.walk(child);
                self.on_path.remove(&child);
                self.path.pop();
            }
        }
    }
}

impl ParsedLockfile {
    /// Walks the graph from the root; see [`traverse`].
    pub fn traverse(&self, visitor: &mut Visitor<'_>) {
        traverse(self, self.root(), visitor);
    }
}
