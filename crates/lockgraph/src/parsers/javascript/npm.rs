use crate::core::graph::{LockfileBuilder, ParsedLockfile};
use crate::core::traits::LockfileParser;
use crate::core::types::{DependencyKind, Manifest, PackageId, PackageManager};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, trace};

const NODE_MODULES: &str = "node_modules";
const NODE_MODULES_SEGMENT: &str = "node_modules/";

/// Parser for npm `package-lock.json` / `npm-shrinkwrap.json` files
/// (lockfileVersion 2 and 3, which carry the flat `packages` table).
///
/// Dependencies are resolved the way Node resolves `require`: from the
/// dependent's own `node_modules` outwards to the top-level one.
#[derive(Debug, Default, Clone, Copy)]
pub struct NpmLockfileParser;

impl LockfileParser for NpmLockfileParser {
    fn parse(&self, contents: &str, _manifest: Option<&Manifest>) -> Result<ParsedLockfile> {
        let lockfile: PackageLock = serde_json::from_str(contents)
            .map_err(|err| Error::malformed(PackageManager::Npm, err))?;

        if !lockfile.packages.contains_key("") {
            return Err(Error::MissingRoot {
                manager: PackageManager::Npm,
            });
        }

        let mut builder = LockfileBuilder::new(PackageManager::Npm);
        let mut by_path: HashMap<&str, PackageId> = HashMap::with_capacity(lockfile.packages.len());

        for (install_path, entry) in &lockfile.packages {
            let name = infer_package_name(install_path, entry, lockfile.name.as_deref());
            let version = if install_path.is_empty() {
                entry.version.clone().or_else(|| lockfile.version.clone())
            } else {
                entry.version.clone()
            };
            let id = builder.add_package(name, version);
            by_path.insert(install_path.as_str(), id);
        }

        for (install_path, entry) in &lockfile.packages {
            let Some(&from) = by_path.get(install_path.as_str()) else {
                continue;
            };
            for kind in DependencyKind::ALL {
                for dep_name in entry.dependencies_of(kind).keys() {
                    let resolved = candidate_paths(install_path, dep_name)
                        .iter()
                        .find_map(|candidate| by_path.get(candidate.as_str()).copied());
                    match resolved {
                        Some(to) => {
                            builder.add_dependency(from, kind, to);
                        }
                        None => trace!(
                            package = %install_path,
                            dependency = %dep_name,
                            kind = %kind,
                            "dropping unresolved npm dependency"
                        ),
                    }
                }
            }
        }

        let root = by_path.get("").copied().ok_or(Error::MissingRoot {
            manager: PackageManager::Npm,
        })?;
        let parsed = builder.build(root)?;
        debug!(packages = parsed.package_count(), "parsed package-lock.json");
        Ok(parsed)
    }

    fn supports_lockfile(&self, file_name: &str) -> bool {
        matches!(
            crate::core::traits::file_name_of(file_name),
            "package-lock.json" | "npm-shrinkwrap.json"
        )
    }

    fn lockfile_name(&self) -> &'static str {
        "package-lock.json"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageLock {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    packages: IndexMap<String, PackageEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    peer_dependencies: IndexMap<String, String>,
    #[serde(default)]
    optional_dependencies: IndexMap<String, String>,
}

impl PackageEntry {
    fn dependencies_of(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        }
    }
}

fn infer_package_name(
    install_path: &str,
    entry: &PackageEntry,
    lockfile_name: Option<&str>,
) -> String {
    if let Some(index) = install_path.rfind(NODE_MODULES_SEGMENT) {
        return install_path[index + NODE_MODULES_SEGMENT.len()..].to_string();
    }
    if let Some(name) = &entry.name {
        return name.clone();
    }
    if install_path.is_empty() {
        return lockfile_name.unwrap_or("root").to_string();
    }
    // Workspace members such as "packages/app" without a declared name
    install_path
        .rsplit('/')
        .next()
        .unwrap_or(install_path)
        .to_string()
}

/// Install paths to try, nearest first, when `parent` requires `name`.
///
/// Starts at `<parent>/node_modules/<name>` and strips one
/// `node_modules/<segment>` level per step. The top-level
/// `node_modules/<name>` always comes last so workspace members outside
/// `node_modules` still see hoisted packages.
pub(crate) fn candidate_paths(parent: &str, name: &str) -> Vec<String> {
    let mut search = if parent.is_empty() {
        NODE_MODULES.to_string()
    } else {
        format!("{parent}/{NODE_MODULES}")
    };
    let mut candidates = vec![format!("{search}/{name}")];

    while let Some(index) = search.rfind(NODE_MODULES_SEGMENT) {
        search.truncate(index + NODE_MODULES.len());
        candidates.push(format!("{search}/{name}"));
    }

    let top_level = format!("{NODE_MODULES}/{name}");
    if !candidates.contains(&top_level) {
        candidates.push(top_level);
    }
    candidates
}
