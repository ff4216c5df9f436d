//! Reader for the classic (v1) `yarn.lock` line format.
//!
//! ```text
//! "@babel/code-frame@^7.0.0", "@babel/code-frame@^7.22.5":
//!   version "7.22.5"
//!   dependencies:
//!     "@babel/highlight" "^7.22.5"
//! ```

use super::yarn::AliasTable;
use crate::core::types::{DependencyKind, PackageId};
use crate::tokenizer::{LineSplitter, unquote};

pub(super) fn read(contents: &str, table: &mut AliasTable) {
    let mut current: Option<PackageId> = None;
    let mut section: Option<DependencyKind> = None;

    for line in LineSplitter::new(contents) {
        let content = line.trim_start_matches(' ');
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        match line.len() - content.len() {
            0 => {
                section = None;
                current = content
                    .strip_suffix(':')
                    .and_then(|header| table.declare(&alias_keys(header)));
            }
            2 => {
                section = None;
                let (Some(id), Some((key, value))) = (current, split_property(content)) else {
                    continue;
                };
                if key == "version" {
                    table.set_version(id, value);
                } else if value.is_empty() {
                    section = DependencyKind::from_field_name(key);
                }
            }
            _ => {
                let (Some(id), Some(kind)) = (current, section) else {
                    continue;
                };
                if let Some((name, range)) = split_property(content) {
                    let target = table.reference(name, range);
                    table.add_dependency(id, kind, target);
                }
            }
        }
    }
}

/// Splits an entry header into its comma-separated, unquoted alias keys.
fn alias_keys(header: &str) -> Vec<&str> {
    header
        .split(',')
        .map(|key| key.trim().trim_matches('"'))
        .filter(|key| !key.is_empty())
        .collect()
}

/// Splits `key "value"`, `key value` or `key: value`, with optionally quoted keys.
fn split_property(content: &str) -> Option<(&str, &str)> {
    let (key, rest) = if let Some(quoted) = content.strip_prefix('"') {
        let close = quoted.find('"')?;
        (&quoted[..close], &quoted[close + 1..])
    } else {
        let end = content.find([' ', ':']).unwrap_or(content.len());
        content.split_at(end)
    };
    if key.is_empty() {
        return None;
    }
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
    Some((key, unquote(rest)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::ParsedLockfile;

    fn read_lockfile(contents: &str) -> ParsedLockfile {
        let mut table = AliasTable::new();
        read(contents, &mut table);
        table.finish(None).unwrap()
    }

    #[test]
    fn test_alias_keys() {
        assert_eq!(
            alias_keys(r#""@babel/core@^7.0.0", "@babel/core@^7.1.0""#),
            ["@babel/core@^7.0.0", "@babel/core@^7.1.0"]
        );
        assert_eq!(alias_keys("left-pad@^1.3.0"), ["left-pad@^1.3.0"]);
    }

    #[test]
    fn test_split_property() {
        assert_eq!(split_property(r#"version "1.3.0""#), Some(("version", "1.3.0")));
        assert_eq!(split_property("version: 1.3.0"), Some(("version", "1.3.0")));
        assert_eq!(split_property("dependencies:"), Some(("dependencies", "")));
        assert_eq!(
            split_property(r#""@babel/highlight" "^7.22.5""#),
            Some(("@babel/highlight", "^7.22.5"))
        );
        assert_eq!(
            split_property(r#"js-tokens "^3.0.0 || ^4.0.0""#),
            Some(("js-tokens", "^3.0.0 || ^4.0.0"))
        );
        assert_eq!(split_property("\"unterminated"), None);
    }

    #[test]
    fn test_stub_is_backfilled_by_later_entry() {
        let parsed = read_lockfile(
            r#"# yarn lockfile v1


a@^1.0.0:
  version "1.0.0"
  dependencies:
    b "^2.0.0"

b@^2.0.0, b@^2.1.0:
  version "2.1.0"
"#,
        );

        let a = parsed.find("a").unwrap();
        let b = parsed.find("b").unwrap();
        assert_eq!(parsed.edges(a, DependencyKind::Runtime), &[b]);
        assert_eq!(parsed.package(b).unwrap().version.as_deref(), Some("2.1.0"));
        assert_eq!(parsed.package_count(), 2);
    }

    #[test]
    fn test_unknown_blocks_are_not_sections() {
        let parsed = read_lockfile(
            r#"# yarn lockfile v1

a@^1.0.0:
  version "1.0.0"
  resolved "https://registry.yarnpkg.com/a/-/a-1.0.0.tgz#abc"
  optionalDependencies:
    fsevents "^2.0.0"
  bin:
    a-cli "bin/cli.js"
"#,
        );

        let a = parsed.find("a").unwrap();
        let fsevents = parsed.find("fsevents").unwrap();
        assert_eq!(parsed.edges(a, DependencyKind::Optional), &[fsevents]);
        assert!(parsed.find("a-cli").is_none());
        assert_eq!(parsed.package(fsevents).unwrap().version.as_deref(), Some(""));
    }

    #[test]
    fn test_undeclared_dependency_keeps_empty_version() {
        let parsed = read_lockfile(
            r#"# yarn lockfile v1

a@^1.0.0:
  version "1.0.0"
  dependencies:
    ghost "^2.0.0"
"#,
        );

        let a = parsed.find("a").unwrap();
        let ghost = parsed.find("ghost").unwrap();
        assert_eq!(parsed.edges(a, DependencyKind::Runtime), &[ghost]);
        assert_eq!(parsed.package(ghost).unwrap().version.as_deref(), Some(""));
        assert_ne!(parsed.package(ghost).unwrap().version, None);
    }
}
