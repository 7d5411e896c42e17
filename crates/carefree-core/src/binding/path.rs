// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Locates the configuration path of a property.

use crate::config::{ConfigTree, ConfigValue};
use crate::naming;

/// The value that makes a property keep its pre-bind value.
pub const FORCE_DEFAULT: &str = "force-default";

/// Finds the configuration path of the property `name`.
///
/// Probes, in order, `prefix.name`, `prefix.kebab(name)`, `prefix.snake(name)`
/// and then the same three under `default_prefix`. A blank `prefix` probes
/// the bare names; a blank `default_prefix` skips the second tier entirely.
pub fn resolve(
    name: &str,
    prefix: Option<&str>,
    default_prefix: Option<&str>,
    tree: &ConfigTree,
) -> Option<String> {
    resolve_variants(
        [name, &naming::to_kebab(name), &naming::to_snake(name)],
        prefix,
        default_prefix,
        tree,
    )
}

/// Like [`resolve`], over precomputed `[verbatim, kebab, snake]` names.
pub(crate) fn resolve_variants(
    names: [&str; 3],
    prefix: Option<&str>,
    default_prefix: Option<&str>,
    tree: &ConfigTree,
) -> Option<String> {
    let primary = qualifier(prefix).unwrap_or_default();
    if let Some(path) = probe(tree, &primary, &names) {
        return Some(path);
    }
    let fallback = qualifier(default_prefix)?;
    probe(tree, &fallback, &names)
}

/// Returns `true` if `value` is the case-insensitive force-default sentinel.
pub fn is_force_default(value: &ConfigValue) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.eq_ignore_ascii_case(FORCE_DEFAULT))
}

fn qualifier(prefix: Option<&str>) -> Option<String> {
    prefix
        .filter(|prefix| !prefix.trim().is_empty())
        .map(|prefix| format!("{prefix}."))
}

fn probe(tree: &ConfigTree, qualifier: &str, names: &[&str; 3]) -> Option<String> {
    names.iter().find_map(|name| {
        let path = format!("{qualifier}{name}");
        log::trace!("Probing configuration path '{path}'");
        tree.has_path(&path).then_some(path)
    })
}
