//! Arena storage for parsed lockfiles.
//!
//! Every package lives in one `Vec` owned by the [`ParsedLockfile`]; edges are
//! [`PackageId`] indices into it. Shared dependencies and cycles are therefore
//! plain repeated indices and need no reference counting.

use crate::core::types::{DependencyKind, Package, PackageId, PackageManager};
use crate::error::{Error, Result};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::fmt;

/// Type alias for dependency graphs using petgraph.
///
/// Node `i` is the package with [`PackageId`] `i`; each edge carries the
/// [`DependencyKind`] it was declared under.
pub type DependencyGraph = petgraph::Graph<PackageRef, DependencyKind>;

/// Lightweight node weight used in [`DependencyGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageRef {
    /// Arena id of the package.
    pub id: PackageId,
    /// Package name.
    pub name: String,
    /// Resolved version, if one was declared.
    pub version: Option<String>,
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// The result of parsing one lockfile: a root node plus every installed package.
///
/// All nodes are created during a single parse and never change afterwards.
/// Two parses of the same input compare equal with `==`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedLockfile {
    manager: PackageManager,
    root: PackageId,
    #[serde(rename = "packages")]
    nodes: Vec<Package>,
}

impl ParsedLockfile {
    /// The package manager that produced the lockfile.
    #[must_use]
    pub const fn manager(&self) -> PackageManager {
        self.manager
    }

    /// Id of the root (project) node.
    #[must_use]
    pub const fn root(&self) -> PackageId {
        self.root
    }

    /// The root (project) node.
    #[must_use]
    pub fn root_package(&self) -> &Package {
        &self.nodes[self.root.index()]
    }

    /// Looks up a package by id. Returns `None` for ids from another lockfile
    /// that fall outside this arena.
    #[must_use]
    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.nodes.get(id.index())
    }

    /// Every non-root package, in creation order.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> + '_ {
        let root = self.root;
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, package)| (PackageId::new(index), package))
            .filter(move |(id, _)| *id != root)
    }

    /// Number of non-root packages.
    #[must_use]
    pub fn package_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// First non-root package with the given name, in creation order.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<PackageId> {
        self.packages()
            .find(|(_, package)| package.name == name)
            .map(|(id, _)| id)
    }

    /// Non-root package with the given name and version.
    #[must_use]
    pub fn find_version(&self, name: &str, version: &str) -> Option<PackageId> {
        self.packages()
            .find(|(_, package)| {
                package.name == name && package.version.as_deref() == Some(version)
            })
            .map(|(id, _)| id)
    }

    /// Outgoing edges of one kind. Empty for unknown ids.
    #[must_use]
    pub fn edges(&self, id: PackageId, kind: DependencyKind) -> &[PackageId] {
        self.package(id).map_or(&[], |package| package.edges(kind))
    }

    /// Exports the arena as a petgraph graph so standard algorithms
    /// (toposort, strongly connected components, dominators) can run on it.
    #[must_use]
    pub fn dependency_graph(&self) -> DependencyGraph {
        let edge_count = self.nodes.iter().map(Package::edge_count).sum();
        let mut graph = DependencyGraph::with_capacity(self.nodes.len(), edge_count);

        for (index, package) in self.nodes.iter().enumerate() {
            graph.add_node(PackageRef {
                id: PackageId::new(index),
                name: package.name.clone(),
                version: package.version.clone(),
            });
        }

        for (index, package) in self.nodes.iter().enumerate() {
            for kind in DependencyKind::ALL {
                for target in package.edges(kind) {
                    graph.add_edge(NodeIndex::new(index), NodeIndex::new(target.index()), kind);
                }
            }
        }

        graph
    }

    /// Returns `true` if any dependency chain leads back to a package on it.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.dependency_graph())
    }
}

/// Incrementally assembles a [`ParsedLockfile`].
///
/// Parsers create nodes first and wire edges afterwards; the builder only
/// checks that both ends of an edge exist.
///
/// # Example
///
/// ```
/// use lockgraph::{DependencyKind, LockfileBuilder, PackageManager};
///
/// let mut builder = LockfileBuilder::new(PackageManager::Npm);
/// let root = builder.add_package("app", Some("1.0.0".to_string()));
/// let react = builder.add_package("react", Some("18.2.0".to_string()));
/// builder.add_dependency(root, DependencyKind::Runtime, react);
///
/// let lockfile = builder.build(root).unwrap();
/// assert_eq!(lockfile.edges(root, DependencyKind::Runtime), &[react]);
/// ```
#[derive(Debug, Clone)]
pub struct LockfileBuilder {
    manager: PackageManager,
    nodes: Vec<Package>,
}

impl LockfileBuilder {
    /// Creates an empty builder for one package manager.
    #[must_use]
    pub const fn new(manager: PackageManager) -> Self {
        Self {
            manager,
            nodes: Vec::new(),
        }
    }

    /// Adds a package without edges and returns its id.
    pub fn add_package(&mut self, name: impl Into<String>, version: Option<String>) -> PackageId {
        let id = PackageId::new(self.nodes.len());
        self.nodes.push(Package::new(name, version));
        id
    }

    /// Appends `to` to the `kind` edge list of `from`.
    ///
    /// Returns `false` (and adds nothing) if either id is unknown.
    pub fn add_dependency(&mut self, from: PackageId, kind: DependencyKind, to: PackageId) -> bool {
        if to.index() >= self.nodes.len() {
            return false;
        }
        match self.nodes.get_mut(from.index()) {
            Some(package) => {
                package.edges_mut(kind).push(to);
                true
            }
            None => false,
        }
    }

    /// Replaces a package's version.
    pub fn set_version(&mut self, id: PackageId, version: Option<String>) {
        if let Some(package) = self.nodes.get_mut(id.index()) {
            package.version = version;
        }
    }

    /// Looks up a package added so far.
    #[must_use]
    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.nodes.get(id.index())
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> Option<&mut Package> {
        self.nodes.get_mut(id.index())
    }

    /// Number of packages added so far, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no package has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finishes the lockfile with `root` as its project node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRoot`] if `root` was not created by this builder.
    pub fn build(self, root: PackageId) -> Result<ParsedLockfile> {
        if root.index() >= self.nodes.len() {
            return Err(Error::MissingRoot {
                manager: self.manager,
            });
        }
        Ok(ParsedLockfile {
            manager: self.manager,
            root,
            nodes: self.nodes,
        })
    }
}
