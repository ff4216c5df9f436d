//! Reader for Berry (Yarn v2+) `yarn.lock` files.
//!
//! ```text
//! "a@npm:1.0.0, a@npm:^1.0.0":
//!   version: 1.0.0
//!   dependencies:
//!     b: "npm:^2.0.0"
//!   dependenciesMeta:
//!     fsevents:
//!       optional: true
//! ```

use super::yarn::AliasTable;
use crate::core::types::{DependencyKind, PackageId};
use crate::tokenizer::IndentedPairs;

const NPM_PROTOCOL: &str = "@npm:";
const DEPENDENCIES_META: &str = "dependenciesMeta";

pub(super) fn read(contents: &str, table: &mut AliasTable) {
    let mut current: Option<PackageId> = None;
    let mut optional: Vec<(PackageId, String)> = Vec::new();

    for pair in IndentedPairs::new(contents) {
        match pair.path.as_slice() {
            [] => {
                current = if pair.value.is_none() && pair.key.contains(NPM_PROTOCOL) {
                    let keys: Vec<&str> = pair.key.split(',').map(str::trim).collect();
                    table.declare(&keys)
                } else {
                    // __metadata, workspace:, patch: and other non-registry entries
                    None
                };
            }
            [_] => {
                if let (Some(id), "version", Some(version)) =
                    (current, pair.key.as_str(), &pair.value)
                {
                    table.set_version(id, version);
                }
            }
            [_, field] => {
                if let (Some(id), Some(kind), Some(range)) =
                    (current, DependencyKind::from_field_name(field), &pair.value)
                {
                    let target = table.reference(&pair.key, range);
                    table.add_dependency(id, kind, target);
                }
            }
            [_, meta, name] if meta == DEPENDENCIES_META => {
                if let (Some(id), "optional", Some("true")) =
                    (current, pair.key.as_str(), pair.value.as_deref())
                {
                    optional.push((id, name.clone()));
                }
            }
            _ => {}
        }
    }

    for (id, name) in optional {
        table.promote_optional(id, &name);
    }
}
