use crate::core::graph::{LockfileBuilder, ParsedLockfile};
use crate::core::traits::LockfileParser;
use crate::core::types::{DependencyKind, Manifest, PackageId, PackageManager, split_name_version};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use jsonc_parser::ParseOptions;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, trace};

const WORKSPACE_PROTOCOL: &str = "workspace:";

/// Parser for Bun's text lockfile `bun.lock`.
///
/// The file is JSON with trailing commas. Each `packages` entry is a tuple
/// `[ "name@version", registry, { dependencies... }, integrity ]`, keyed by an
/// install key such as `react` or `react-dom/scheduler` for a nested copy.
/// The binary `bun.lockb` is handled through
/// [`BinaryLockfileDecoder`](crate::BinaryLockfileDecoder) instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct BunLockfileParser;

impl LockfileParser for BunLockfileParser {
    fn parse(&self, contents: &str, _manifest: Option<&Manifest>) -> Result<ParsedLockfile> {
        let lockfile = read_lockfile(contents)?;

        let Some(root_workspace) = lockfile.workspaces.get("") else {
            return Err(Error::MissingRoot {
                manager: PackageManager::Bun,
            });
        };

        let mut builder = LockfileBuilder::new(PackageManager::Bun);
        let mut by_key: HashMap<&str, PackageId> = HashMap::with_capacity(lockfile.packages.len());
        let mut specifiers: Vec<(&str, &str)> = Vec::with_capacity(lockfile.packages.len());

        for (key, tuple) in &lockfile.packages {
            let specifier = tuple
                .first()
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    Error::malformed(
                        PackageManager::Bun,
                        format!("package `{key}` does not start with a version specifier string"),
                    )
                })?;
            let (name, version) = split_name_version(specifier);
            let id = builder.add_package(name, version.map(str::to_string));
            by_key.insert(key.as_str(), id);
            specifiers.push((key.as_str(), specifier));
        }

        for (key, specifier) in specifiers {
            let Some(&from) = by_key.get(key) else {
                continue;
            };
            let info = match split_name_version(specifier).1 {
                Some(version) if version.starts_with(WORKSPACE_PROTOCOL) => lockfile
                    .workspaces
                    .get(&version[WORKSPACE_PROTOCOL.len()..])
                    .cloned()
                    .unwrap_or_default(),
                _ => {
                    let raw = lockfile.packages.get(key).and_then(|tuple| tuple.get(2));
                    dependency_info(key, raw)?
                }
            };
            add_dependencies(&mut builder, &by_key, from, Some(key), &info);
        }

        let root_name = root_workspace.name.clone().unwrap_or_else(|| "root".to_string());
        let root = builder.add_package(root_name, root_workspace.version.clone());
        add_dependencies(&mut builder, &by_key, root, None, root_workspace);

        let parsed = builder.build(root)?;
        debug!(packages = parsed.package_count(), "parsed bun.lock");
        Ok(parsed)
    }

    fn lockfile_name(&self) -> &'static str {
        "bun.lock"
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BunLockfile {
    #[serde(default)]
    workspaces: IndexMap<String, BunDependencyInfo>,
    #[serde(default)]
    packages: IndexMap<String, Vec<Value>>,
}

/// A workspace entry, or the third element of a package tuple.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BunDependencyInfo {
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

impl BunDependencyInfo {
    fn dependencies_of(&self, kind: DependencyKind) -> &IndexMap<String, String> {
        match kind {
            DependencyKind::Runtime => &self.dependencies,
            DependencyKind::Dev => &self.dev_dependencies,
            DependencyKind::Peer => &self.peer_dependencies,
            DependencyKind::Optional => &self.optional_dependencies,
        }
    }
}

fn dependency_info(key: &str, raw: Option<&Value>) -> Result<BunDependencyInfo> {
    match raw {
        Some(value) if value.is_object() => BunDependencyInfo::deserialize(value).map_err(|err| {
            Error::malformed(PackageManager::Bun, format!("package `{key}`: {err}"))
        }),
        _ => Ok(BunDependencyInfo::default()),
    }
}

/// Adds edges for every dependency map in `info`. A nested install
/// `<key>/<dep>` shadows the hoisted `<dep>`.
fn add_dependencies(
    builder: &mut LockfileBuilder,
    by_key: &HashMap<&str, PackageId>,
    from: PackageId,
    key: Option<&str>,
    info: &BunDependencyInfo,
) {
    for kind in DependencyKind::ALL {
        for dep_name in info.dependencies_of(kind).keys() {
            let nested = key.and_then(|key| by_key.get(format!("{key}/{dep_name}").as_str()));
            match nested.or_else(|| by_key.get(dep_name.as_str())) {
                Some(&to) => {
                    builder.add_dependency(from, kind, to);
                }
                None => trace!(
                    package = key.unwrap_or_default(),
                    dependency = %dep_name,
                    kind = %kind,
                    "dropping unresolved bun dependency"
                ),
            }
        }
    }
}

/// Reads the JSONC body of `bun.lock`. Trailing commas are accepted, comments
/// and unquoted property names are not.
fn read_lockfile(contents: &str) -> Result<BunLockfile> {
    let options = ParseOptions {
        allow_comments: false,
        allow_loose_object_property_names: false,
        allow_trailing_commas: true,
        ..ParseOptions::default()
    };
    let value = jsonc_parser::parse_to_serde_value(contents, &options)
        .map_err(|err| Error::malformed(PackageManager::Bun, err))?
        .ok_or_else(|| Error::malformed(PackageManager::Bun, "empty document"))?;

    serde_json::from_value(value).map_err(|err| Error::malformed(PackageManager::Bun, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<ParsedLockfile> {
        BunLockfileParser.parse(contents, None)
    }

    #[test]
    fn test_trailing_commas_accepted() {
        let parsed = parse(r#"{"workspaces": {"": {}}, "packages": {}, }"#).unwrap();
        assert_eq!(parsed.package_count(), 0);

        let parsed = parse(
            r#"{"workspaces": {"": {"dependencies": {"a": "^1.0.0",},},}, "packages": {"a": ["a@1.0.0", "", {}, "sha",],},}"#,
        )
        .unwrap();
        let a = parsed.find("a").unwrap();
        assert_eq!(parsed.root_package().dependencies, vec![a]);
    }

    #[test]
    fn test_commas_inside_strings_are_kept() {
        let parsed = parse(
            r#"{"workspaces": {"": {"name": "x,}", "version": "y\",]",},}, "packages": {},}"#,
        )
        .unwrap();

        assert_eq!(parsed.root_package().name, "x,}");
        assert_eq!(parsed.root_package().version.as_deref(), Some("y\",]"));
    }

    #[test]
    fn test_comments_are_rejected() {
        let err = parse("{\n  // note\n  \"workspaces\": {\"\": {}}\n}").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { manager: PackageManager::Bun, .. }));

        let err = parse("   ").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { manager: PackageManager::Bun, .. }));
    }

    #[test]
    fn test_minimal_lockfile() {
        let parsed = parse(
            r#"{
  "lockfileVersion": 1,
  "workspaces": {
    "": {
      "name": "app",
      "dependencies": {
        "left-pad": "^1.3.0",
      },
    },
  },
  "packages": {
    "left-pad": ["left-pad@1.3.0", "", {}, "sha512-abc"],
  }
}"#,
        )
        .unwrap();

        let root = parsed.root_package();
        assert_eq!(root.name, "app");
        let left_pad = parsed.find("left-pad").unwrap();
        assert_eq!(root.dependencies, vec![left_pad]);
        assert_eq!(parsed.package(left_pad).unwrap().version.as_deref(), Some("1.3.0"));
    }

    #[test]
    fn test_nested_key_shadows_hoisted() {
        let parsed = parse(
            r#"{
  "workspaces": { "": { "dependencies": { "a": "^1.0.0", "@scope/b": "^2.0.0" } } },
  "packages": {
    "a": ["a@1.0.0", "", { "dependencies": { "@scope/b": "^1.0.0" } }, "sha"],
    "a/@scope/b": ["@scope/b@1.0.0", "", {}, "sha"],
    "@scope/b": ["@scope/b@2.0.0", "", {}, "sha"]
  }
}"#,
        )
        .unwrap();

        let a = parsed.find("a").unwrap();
        let nested = parsed.find_version("@scope/b", "1.0.0").unwrap();
        let hoisted = parsed.find_version("@scope/b", "2.0.0").unwrap();

        assert_eq!(parsed.edges(a, DependencyKind::Runtime), &[nested]);
        assert_eq!(parsed.root_package().dependencies, vec![a, hoisted]);
        assert_eq!(parsed.root_package().name, "root");
    }

    #[test]
    fn test_workspace_member_takes_workspace_dependencies() {
        let parsed = parse(
            r#"{
  "workspaces": {
    "": { "name": "mono", "devDependencies": { "web": "workspace:*" } },
    "packages/web": { "name": "web", "version": "0.2.0", "dependencies": { "left-pad": "^1.3.0" } },
  },
  "packages": {
    "left-pad": ["left-pad@1.3.0", "", {}, "sha"],
    "web": ["web@workspace:packages/web"],
  },
}"#,
        )
        .unwrap();

        let web = parsed.find("web").unwrap();
        let left_pad = parsed.find("left-pad").unwrap();
        assert_eq!(parsed.edges(web, DependencyKind::Runtime), &[left_pad]);
        assert_eq!(parsed.root_package().dev_dependencies, vec![web]);
    }

    #[test]
    fn test_missing_root_workspace() {
        let err = parse(r#"{"workspaces": {}, "packages": {}}"#).unwrap_err();
        assert!(matches!(err, Error::MissingRoot { manager: PackageManager::Bun }));

        let err = parse(r#"{"packages": {}}"#).unwrap_err();
        assert!(matches!(err, Error::MissingRoot { .. }));
    }

    #[test]
    fn test_malformed_documents() {
        let err = parse("{ \"workspaces\": ").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { manager: PackageManager::Bun, .. }));

        let err = parse(r#"{"workspaces": {"": {}}, "packages": {"a": [42]}}"#).unwrap_err();
        assert!(err.to_string().contains("package `a`"));
    }
}
