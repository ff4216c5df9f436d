use super::{yarn_classic, yarn_modern};
use crate::core::graph::{LockfileBuilder, ParsedLockfile};
use crate::core::traits::LockfileParser;
use crate::core::types::{DependencyKind, Manifest, PackageId, PackageManager, split_name_version};
use crate::error::Result;
use std::collections::HashMap;
use tracing::{debug, trace};

const CLASSIC_MARKER: &str = "# yarn lockfile v1";

/// Parser for `yarn.lock`, covering both the classic v1 format and the Berry
/// (v2+) YAML format.
///
/// Yarn lockfiles do not say which entries the project itself depends on, so
/// the root's edges are only filled in when a [`Manifest`] is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct YarnLockfileParser;

impl LockfileParser for YarnLockfileParser {
    fn parse(&self, contents: &str, manifest: Option<&Manifest>) -> Result<ParsedLockfile> {
        let mut table = AliasTable::new();
        let classic = is_classic(contents);

        if classic {
            yarn_classic::read(contents, &mut table);
        } else {
            yarn_modern::read(contents, &mut table);
        }

        let parsed = table.finish(manifest)?;
        debug!(classic, packages = parsed.package_count(), "parsed yarn.lock");
        Ok(parsed)
    }

    fn lockfile_name(&self) -> &'static str {
        "yarn.lock"
    }
}

/// Returns `true` for the classic v1 line format.
#[must_use]
pub fn is_classic(contents: &str) -> bool {
    contents.contains(CLASSIC_MARKER)
}

/// Maps every alias key (`name@range`) to the one node that satisfies it.
pub(super) struct AliasTable {
    builder: LockfileBuilder,
    keys: HashMap<String, PackageId>,
}

impl AliasTable {
    pub(super) fn new() -> Self {
        Self {
            builder: LockfileBuilder::new(PackageManager::Yarn),
            keys: HashMap::new(),
        }
    }

    /// Registers a group of alias keys that share one install.
    ///
    /// The first key that is already known supplies the node; otherwise a new
    /// node named after the first key is created. Every key then maps to it.
    pub(super) fn declare<S: AsRef<str>>(&mut self, keys: &[S]) -> Option<PackageId> {
        let first = keys.first()?.as_ref();
        let id = match keys.iter().find_map(|key| self.keys.get(key.as_ref()).copied()) {
            Some(existing) => existing,
            None => {
                let (name, _) = split_name_version(first);
                self.builder.add_package(name, Some(String::new()))
            }
        };
        for key in keys {
            self.keys.entry(key.as_ref().to_string()).or_insert(id);
        }
        Some(id)
    }

    /// Node for `name@range`. A key that is not yet declared gets a node with an
    /// empty version, filled in once its own entry is read.
    pub(super) fn reference(&mut self, name: &str, range: &str) -> PackageId {
        let key = format!("{name}@{range}");
        if let Some(&id) = self.keys.get(&key) {
            return id;
        }
        let id = self.builder.add_package(name, Some(String::new()));
        self.keys.insert(key, id);
        id
    }

    pub(super) fn set_version(&mut self, id: PackageId, version: &str) {
        self.builder.set_version(id, Some(version.to_string()));
    }

    pub(super) fn add_dependency(&mut self, from: PackageId, kind: DependencyKind, to: PackageId) {
        self.builder.add_dependency(from, kind, to);
    }

    /// Moves the first runtime edge of `from` that points at a package named
    /// `name` to the optional edge list.
    pub(super) fn promote_optional(&mut self, from: PackageId, name: &str) {
        let position = self.builder.package(from).and_then(|package| {
            package.dependencies.iter().position(|&target| {
                self.builder
                    .package(target)
                    .is_some_and(|dependency| dependency.name == name)
            })
        });

        match (position, self.builder.package_mut(from)) {
            (Some(index), Some(package)) => {
                let target = package.dependencies.remove(index);
                package.optional_dependencies.push(target);
            }
            _ => trace!(dependency = %name, "no runtime dependency to mark optional"),
        }
    }

    fn lookup_root_dependency(&self, name: &str, range: &str) -> Option<PackageId> {
        self.keys
            .get(&format!("{name}@npm:{range}"))
            .or_else(|| self.keys.get(&format!("{name}@{range}")))
            .copied()
    }

    /// Adds the project root and builds the lockfile.
    pub(super) fn finish(mut self, manifest: Option<&Manifest>) -> Result<ParsedLockfile> {
        let root_name = manifest
            .and_then(|manifest| manifest.name.clone())
            .unwrap_or_else(|| "root".to_string());
        let root_version = manifest
            .and_then(|manifest| manifest.version.clone())
            .unwrap_or_default();
        let root = self.builder.add_package(root_name, Some(root_version));

        if let Some(manifest) = manifest {
            for kind in DependencyKind::ALL {
                for (name, range) in manifest.dependencies_of(kind) {
                    match self.lookup_root_dependency(name, range) {
                        Some(target) => {
                            self.builder.add_dependency(root, kind, target);
                        }
                        None => trace!(
                            dependency = %name,
                            range = %range,
                            kind = %kind,
                            "manifest dependency not found in yarn.lock"
                        ),
                    }
                }
            }
        }

        self.builder.build(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_classic_marker() {
        assert!(is_classic("# THIS IS AN AUTOGENERATED FILE.\n# yarn lockfile v1\n\n"));
        assert!(!is_classic("__metadata:\n  version: 8\n"));
    }

    #[test]
    fn test_declare_reuses_first_known_key() {
        let mut table = AliasTable::new();
        let stub = table.reference("a", "npm:^1.0.0");
        let declared = table.declare(&["a@npm:1.0.0", "a@npm:^1.0.0"]).unwrap();

        assert_eq!(stub, declared);
        assert_eq!(table.builder.package(stub).unwrap().version.as_deref(), Some(""));
        assert_eq!(table.keys.get("a@npm:1.0.0"), Some(&declared));
        assert!(table.declare::<&str>(&[]).is_none());
    }

    #[test]
    fn test_declare_names_node_after_first_key() {
        let mut table = AliasTable::new();
        let id = table.declare(&["@scope/pkg@npm:^2.0.0"]).unwrap();
        table.set_version(id, "2.1.0");

        let parsed = table.finish(None).unwrap();
        let package = parsed.package(id).unwrap();
        assert_eq!(package.name, "@scope/pkg");
        assert_eq!(package.version.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn test_promote_optional_moves_first_match() {
        let mut table = AliasTable::new();
        let parent = table.declare(&["parent@npm:1.0.0"]).unwrap();
        let keep = table.reference("keep", "npm:^1.0.0");
        let fsevents = table.reference("fsevents", "npm:^2.0.0");
        table.add_dependency(parent, DependencyKind::Runtime, keep);
        table.add_dependency(parent, DependencyKind::Runtime, fsevents);

        table.promote_optional(parent, "fsevents");
        table.promote_optional(parent, "missing");

        let parsed = table.finish(None).unwrap();
        assert_eq!(parsed.edges(parent, DependencyKind::Runtime), &[keep]);
        assert_eq!(parsed.edges(parent, DependencyKind::Optional), &[fsevents]);
    }

    #[test]
    fn test_root_without_manifest() {
        let parsed = AliasTable::new().finish(None).unwrap();
        let root = parsed.root_package();

        assert_eq!(root.name, "root");
        assert_eq!(root.version.as_deref(), Some(""));
        assert_eq!(root.edge_count(), 0);
    }

    #[test]
    fn test_root_edges_from_manifest() {
        let mut table = AliasTable::new();
        let berry = table.declare(&["a@npm:^1.0.0"]).unwrap();
        let classic = table.declare(&["b@^2.0.0"]).unwrap();

        let manifest = Manifest::from_json(
            r#"{"name": "app", "version": "0.1.0",
                "dependencies": {"a": "^1.0.0", "missing": "^1.0.0"},
                "devDependencies": {"b": "^2.0.0"}}"#,
        )
        .unwrap();

        let parsed = table.finish(Some(&manifest)).unwrap();
        let root = parsed.root_package();
        assert_eq!(root.name, "app");
        assert_eq!(root.version.as_deref(), Some("0.1.0"));
        assert_eq!(root.dependencies, vec![berry]);
        assert_eq!(root.dev_dependencies, vec![classic]);
    }
}
