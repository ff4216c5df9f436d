//! Core types for representing package managers, packages and manifests.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the package manager a lockfile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    /// npm (`package-lock.json`)
    Npm,
    /// Yarn, both the classic v1 format and the Berry (v2+) format (`yarn.lock`)
    Yarn,
    /// pnpm (`pnpm-lock.yaml`)
    Pnpm,
    /// Bun (`bun.lock`, or `bun.lockb` through a binary decoder)
    Bun,
}

impl PackageManager {
    /// Returns the lockfile name for this package manager.
    ///
    /// # Example
    ///
    /// ```
    /// use lockgraph::PackageManager;
    ///
    /// assert_eq!(PackageManager::Npm.lockfile_name(), "package-lock.json");
    /// assert_eq!(PackageManager::Pnpm.lockfile_name(), "pnpm-lock.yaml");
    /// ```
    #[must_use]
    pub const fn lockfile_name(self) -> &'static str {
        match self {
            Self::Npm => "package-lock.json",
            Self::Yarn => "yarn.lock",
            Self::Pnpm => "pnpm-lock.yaml",
            Self::Bun => "bun.lock",
        }
    }

    /// Short lowercase tag, the same token the dispatcher accepts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four kinds of dependency edges a package can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyKind {
    /// `dependencies`
    Runtime,
    /// `devDependencies`
    Dev,
    /// `peerDependencies`
    Peer,
    /// `optionalDependencies`
    Optional,
}

impl DependencyKind {
    /// Every kind, in the order edge lists are visited.
    pub const ALL: [Self; 4] = [Self::Runtime, Self::Dev, Self::Peer, Self::Optional];

    /// The manifest/lockfile key naming this kind of dependency map.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Runtime => "dependencies",
            Self::Dev => "devDependencies",
            Self::Peer => "peerDependencies",
            Self::Optional => "optionalDependencies",
        }
    }

    /// Maps a dependency-map key back to its kind.
    ///
    /// ```
    /// use lockgraph::DependencyKind;
    ///
    /// assert_eq!(DependencyKind::from_field_name("devDependencies"), Some(DependencyKind::Dev));
    /// assert_eq!(DependencyKind::from_field_name("dependenciesMeta"), None);
    /// ```
    #[must_use]
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.field_name() == name)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Index of a package inside the arena of one [`ParsedLockfile`](crate::ParsedLockfile).
///
/// Package identity is by index: two ids are the same package exactly when they
/// are equal. Ids are only meaningful for the lockfile that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(usize);

impl PackageId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the package in its lockfile's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single installed package (or the project root) with its outgoing edges.
///
/// Edge lists keep the order in which the source file declared them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package name, e.g. `react` or `@babel/core`.
    pub name: String,

    /// Resolved version.
    ///
    /// `None` means the entry has no version field at all. `Some("")` marks a
    /// version that is not resolved yet: yarn nodes start out that way and
    /// keep it when their own entry never shows up.
    pub version: Option<String>,

    /// Runtime dependencies.
    pub dependencies: Vec<PackageId>,

    /// Development dependencies.
    pub dev_dependencies: Vec<PackageId>,

    /// Peer dependencies.
    pub peer_dependencies: Vec<PackageId>,

    /// Optional dependencies.
    pub optional_dependencies: Vec<PackageId>,
}

impl Package {
    /// Creates a package with no edges.
    #[must_use]
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            peer_dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
        }
    }

    /// The edge list for one kind of dependency.
    #[must_use]
    pub fn edges(&self, kind: DependencyKind) -> &[PackageId] {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        }
    }

    pub(crate) fn edges_mut(&mut self, kind: DependencyKind) -> &mut Vec<PackageId> {
        match kind {
            DependencyKind::Runtime => &mut self.dependencies,
            DependencyKind::Dev => &mut self.dev_dependencies,
            DependencyKind::Peer => &mut self.peer_dependencies,
            DependencyKind::Optional => &mut self.optional_dependencies,
        }
    }

    /// The version, or `""` when none was declared.
    #[must_use]
    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }

    /// Total number of outgoing edges across all four kinds.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        DependencyKind::ALL
            .into_iter()
            .map(|kind| self.edges(kind).len())
            .sum()
    }
}

/// The parts of a `package.json` that lockfile parsing can use.
///
/// Only yarn consults it: yarn lockfiles do not record which entries the
/// project itself depends on, so the root's edges come from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Declared package name.
    #[serde(default)]
    pub name: Option<String>,

    /// Declared package version.
    #[serde(default)]
    pub version: Option<String>,

    /// `dependencies` (name → semver range).
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// `devDependencies` (name → semver range).
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,

    /// `peerDependencies` (name → semver range).
    #[serde(default)]
    pub peer_dependencies: IndexMap<String, String>,

    /// `optionalDependencies` (name → semver range).
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
}

impl Manifest {
    /// Reads a manifest from `package.json` text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if the text is not valid JSON or a
    /// dependency map holds something other than strings.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|source| Error::InvalidManifest { source })
    }

    /// The dependency map for one kind.
    #[must_use]
    pub fn dependencies_of(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        }
    }
}

/// Splits a `name@version` string at the first `@` after the first character, so
/// that scoped names (`@scope/name@1.0.0`) keep their leading `@`.
///
/// Returns `None` for the version when there is no separator.
pub(crate) fn split_name_version(descriptor: &str) -> (&str, Option<&str>) {
    match descriptor.char_indices().skip(1).find(|&(_, c)| c == '@') {
        Some((at, _)) => (&descriptor[..at], Some(&descriptor[at + 1..])),
        None => (descriptor, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependency_kind_field_names_round_trip() {
        for kind in DependencyKind::ALL {
            assert_eq!(DependencyKind::from_field_name(kind.field_name()), Some(kind));
        }
        assert_eq!(DependencyKind::from_field_name("resolution"), None);
    }

    #[test]
    fn split_name_version_handles_scopes() {
        assert_eq!(split_name_version("left-pad@1.3.0"), ("left-pad", Some("1.3.0")));
        assert_eq!(
            split_name_version("@babel/core@7.22.5"),
            ("@babel/core", Some("7.22.5"))
        );
        assert_eq!(split_name_version("a@npm:^1.0.0"), ("a", Some("npm:^1.0.0")));
        assert_eq!(split_name_version("no-version"), ("no-version", None));
        assert_eq!(split_name_version("@scope/only"), ("@scope/only", None));
        assert_eq!(split_name_version(""), ("", None));
    }

    #[test]
    fn split_name_version_multibyte_first_char() {
        assert_eq!(split_name_version("é@1.0.0"), ("é", Some("1.0.0")));
        assert_eq!(split_name_version("日本@2.0.0"), ("日本", Some("2.0.0")));
        assert_eq!(split_name_version("@"), ("@", None));
        assert_eq!(split_name_version("a@"), ("a", Some("")));
    }

    #[test]
    fn package_edges_by_kind() {
        let mut package = Package::new("a", Some("1.0.0".to_string()));
        package.edges_mut(DependencyKind::Peer).push(PackageId::new(3));

        assert_eq!(package.edges(DependencyKind::Peer), &[PackageId::new(3)]);
        assert!(package.edges(DependencyKind::Runtime).is_empty());
        assert_eq!(package.edge_count(), 1);
    }

    #[test]
    fn version_str_distinguishes_nothing_but_reads_empty() {
        let declared_empty = Package::new("a", Some(String::new()));
        let undeclared = Package::new("a", None);

        assert_eq!(declared_empty.version_str(), "");
        assert_eq!(undeclared.version_str(), "");
        assert_ne!(declared_empty, undeclared);
    }

    #[test]
    fn manifest_from_package_json() {
        let manifest = Manifest::from_json(
            r#"{
  "name": "acme-app",
  "version": "1.0.0",
  "dependencies": { "react": "^18.2.0", "left-pad": "^1.3.0" },
  "devDependencies": { "typescript": "^5.0.0" },
  "scripts": { "build": "tsc" }
}"#,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("acme-app"));
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        let names: Vec<_> = manifest.dependencies.keys().map(String::as_str).collect();
        assert_eq!(names, ["react", "left-pad"]);
        assert_eq!(manifest.dependencies_of(DependencyKind::Dev).len(), 1);
        assert!(manifest.dependencies_of(DependencyKind::Peer).is_empty());
    }

    #[test]
    fn manifest_rejects_non_string_ranges() {
        let err = Manifest::from_json(r#"{"dependencies": {"react": 18}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest { .. }));
    }
}
