use crate::core::graph::{LockfileBuilder, ParsedLockfile};
use crate::core::traits::LockfileParser;
use crate::core::types::{DependencyKind, Manifest, PackageId, PackageManager, split_name_version};
use crate::error::Result;
use crate::tokenizer::IndentedPairs;
use std::collections::HashMap;
use tracing::debug;

const ROOT_IMPORTER: &str = ".";

/// Parser for pnpm `pnpm-lock.yaml` files.
///
/// Root edges come from the `.` importer, package edges from `snapshots`
/// (lockfile v9) or from the dependency maps under `packages` (v6). Packages
/// are identified by `name@version` with any peer suffix such as
/// `(react@18.2.0)` removed, so peer variants of one version share a node.
#[derive(Debug, Default, Clone, Copy)]
pub struct PnpmLockfileParser;

impl LockfileParser for PnpmLockfileParser {
    fn parse(&self, contents: &str, _manifest: Option<&Manifest>) -> Result<ParsedLockfile> {
        let mut graph = PnpmGraph::new();

        for pair in IndentedPairs::new(contents) {
            let path: Vec<&str> = pair.path.iter().map(String::as_str).collect();
            match (path.as_slice(), pair.value.as_deref()) {
                // importers:
                //   .:
                //     dependencies:
                //       react:
                //         version: 18.2.0
                (["importers", ROOT_IMPORTER, field, name], Some(version))
                    if pair.key == "version" =>
                {
                    graph.add_root_dependency(field, name, version);
                }
                // lockfile v6 single-project layout: top-level dependency maps
                ([field, name], Some(version)) if pair.key == "version" => {
                    graph.add_root_dependency(field, name, version);
                }
                (["packages" | "snapshots"], _) => {
                    graph.package_for_key(&pair.key);
                }
                (["snapshots", package_key, field], Some(version)) => {
                    graph.add_package_dependency(package_key, field, &pair.key, version);
                }
                // v6 keeps resolved dependencies on `/name@version` package entries;
                // its peerDependencies are ranges, not resolutions
                (["packages", package_key, field], Some(version))
                    if package_key.starts_with('/') && *field != "peerDependencies" =>
                {
                    graph.add_package_dependency(package_key, field, &pair.key, version);
                }
                _ => {}
            }
        }

        let parsed = graph.builder.build(graph.root)?;
        debug!(packages = parsed.package_count(), "parsed pnpm-lock.yaml");
        Ok(parsed)
    }

    fn lockfile_name(&self) -> &'static str {
        "pnpm-lock.yaml"
    }
}

struct PnpmGraph {
    builder: LockfileBuilder,
    root: PackageId,
    by_key: HashMap<String, PackageId>,
}

impl PnpmGraph {
    fn new() -> Self {
        let mut builder = LockfileBuilder::new(PackageManager::Pnpm);
        let root = builder.add_package("root", None);
        Self {
            builder,
            root,
            by_key: HashMap::new(),
        }
    }

    fn package(&mut self, name: &str, version: Option<&str>) -> PackageId {
        let version = version.map(strip_peer_suffix);
        let key = match version {
            Some(version) => format!("{name}@{version}"),
            None => name.to_string(),
        };
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.builder.add_package(name, version.map(str::to_string));
        self.by_key.insert(key, id);
        id
    }

    /// Node for a `packages`/`snapshots` key such as `@scope/a@1.0.0(b@2.0.0)`
    /// or the v6 form `/a@1.0.0`.
    fn package_for_key(&mut self, package_key: &str) -> PackageId {
        let package_key = package_key.strip_prefix('/').unwrap_or(package_key);
        let (name, version) = split_name_version(package_key);
        self.package(name, version)
    }

    fn add_root_dependency(&mut self, field: &str, name: &str, version: &str) {
        if let Some(kind) = DependencyKind::from_field_name(field) {
            let target = self.package(name, Some(version));
            self.builder.add_dependency(self.root, kind, target);
        }
    }

    fn add_package_dependency(
        &mut self,
        package_key: &str,
        field: &str,
        name: &str,
        version: &str,
    ) {
        if let Some(kind) = DependencyKind::from_field_name(field) {
            let from = self.package_for_key(package_key);
            let target = self.package(name, Some(version));
            self.builder.add_dependency(from, kind, target);
        }
    }
}

/// `1.2.3(react@18.2.0)` → `1.2.3`.
fn strip_peer_suffix(version: &str) -> &str {
    version.find('(').map_or(version, |index| &version[..index])
}
