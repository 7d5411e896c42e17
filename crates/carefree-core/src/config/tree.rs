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

//! The immutable, dotted-path addressable configuration tree.

use super::{ConfigError, ConfigValue, Number};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A hierarchical configuration document addressed by dotted paths.
///
/// Paths are case-sensitive and split on `.`; `db.pool.max-active` walks
/// the `db` and `pool` objects and reads `max-active`. A path holding an
/// explicit null is indistinguishable from an absent path.
///
/// The typed getters convert the way HOCON does: numbers and booleans read as
/// strings, numeric strings read as numbers, and `true`/`yes`/`on` or
/// `false`/`no`/`off` strings read as booleans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigTree {
    root: BTreeMap<String, ConfigValue>,
}

impl ConfigTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-built object.
    pub fn from_object(root: BTreeMap<String, ConfigValue>) -> Self {
        Self { root }
    }

    /// Parses a JSON document whose top level is an object.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Builds a tree from `(dotted path, value)` pairs, properties-file style.
    ///
    /// Later entries overwrite earlier ones on the same path.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<ConfigValue>,
    {
        let mut tree = Self::new();
        for (path, value) in entries {
            tree.insert(path.as_ref(), value.into());
        }
        tree
    }

    /// Returns a copy of this tree with `value` placed at `path`.
    ///
    /// Intermediate non-object values on the way are replaced by objects.
    pub fn with_value(mut self, path: &str, value: impl Into<ConfigValue>) -> Self {
        self.insert(path, value.into());
        self
    }

    fn insert(&mut self, path: &str, value: ConfigValue) {
        let mut segments = path.split('.').peekable();
        let mut current = &mut self.root;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                current.insert(segment.to_owned(), value);
                return;
            }
            let slot = current
                .entry(segment.to_owned())
                .or_insert_with(|| ConfigValue::Object(BTreeMap::new()));
            if !matches!(slot, ConfigValue::Object(_)) {
                *slot = ConfigValue::Object(BTreeMap::new());
            }
            current = match slot {
                ConfigValue::Object(children) => children,
                _ => return,
            };
        }
    }

    /// The top-level object of the tree.
    pub fn root(&self) -> &BTreeMap<String, ConfigValue> {
        &self.root
    }

    /// Returns `true` when the tree has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    fn lookup(&self, path: &str) -> Option<&ConfigValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.root.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Returns `true` if `path` holds a non-null value.
    pub fn has_path(&self, path: &str) -> bool {
        self.lookup(path).is_some_and(|value| !value.is_null())
    }

    /// Returns the raw value at `path`.
    pub fn get_value(&self, path: &str) -> Result<&ConfigValue, ConfigError> {
        match self.lookup(path) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(ConfigError::Missing {
                path: path.to_owned(),
            }),
        }
    }

    /// Reads a scalar as a string.
    pub fn get_string(&self, path: &str) -> Result<String, ConfigError> {
        let value = self.get_value(path)?;
        value
            .render()
            .ok_or_else(|| ConfigError::wrong_type(path, "string", value))
    }

    /// Reads a number, parsing numeric strings.
    pub fn get_number(&self, path: &str) -> Result<Number, ConfigError> {
        match self.get_value(path)? {
            ConfigValue::Number(number) => Ok(*number),
            ConfigValue::String(text) => parse_number(text).ok_or_else(|| ConfigError::BadValue {
                path: path.to_owned(),
                expected: "number",
                value: text.clone(),
            }),
            other => Err(ConfigError::wrong_type(path, "number", other)),
        }
    }

    /// Reads a 32-bit integer; fractional parts are truncated, out-of-range values fail.
    pub fn get_int(&self, path: &str) -> Result<i32, ConfigError> {
        let number = self.get_number(path)?;
        i32::try_from(number.as_i64()).map_err(|_| ConfigError::OutOfRange {
            path: path.to_owned(),
            expected: "32-bit integer",
            value: number.to_string(),
        })
    }

    /// Reads a 64-bit integer; fractional parts are truncated.
    pub fn get_long(&self, path: &str) -> Result<i64, ConfigError> {
        self.get_number(path).map(Number::as_i64)
    }

    /// Reads a double.
    pub fn get_double(&self, path: &str) -> Result<f64, ConfigError> {
        self.get_number(path).map(Number::as_f64)
    }

    /// Reads a boolean.
    pub fn get_bool(&self, path: &str) -> Result<bool, ConfigError> {
        match self.get_value(path)? {
            ConfigValue::Bool(value) => Ok(*value),
            ConfigValue::String(text) => match text.as_str() {
                "true" | "yes" | "on" => Ok(true),
                "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::BadValue {
                    path: path.to_owned(),
                    expected: "boolean",
                    value: text.clone(),
                }),
            },
            other => Err(ConfigError::wrong_type(path, "boolean", other)),
        }
    }

    /// Reads a list of raw values.
    pub fn get_list(&self, path: &str) -> Result<&[ConfigValue], ConfigError> {
        let value = self.get_value(path)?;
        value
            .as_list()
            .ok_or_else(|| ConfigError::wrong_type(path, "list", value))
    }

    /// Returns the object at `path` as a tree of its own.
    pub fn get_tree(&self, path: &str) -> Result<ConfigTree, ConfigError> {
        let value = self.get_value(path)?;
        value
            .as_object()
            .map(|object| ConfigTree::from_object(object.clone()))
            .ok_or_else(|| ConfigError::wrong_type(path, "object", value))
    }

    /// The immediate child keys of the top level.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Every non-null leaf of the tree as `(dotted path, value)`.
    ///
    /// Lists are leaves; objects are descended into.
    pub fn entries(&self) -> Vec<(String, &ConfigValue)> {
        let mut entries = Vec::new();
        collect_entries(&self.root, "", &mut entries);
        entries
    }

    /// The top-level keys under which at least one nested leaf exists.
    ///
    /// `{a.x = 1, b = 2}` has the single root `a`: a top-level scalar such as
    /// `b` does not describe an entity of its own.
    pub fn roots(&self) -> BTreeSet<String> {
        self.entries()
            .into_iter()
            .filter_map(|(path, _)| match path.find('.') {
                Some(index) if index > 0 => Some(path[..index].to_owned()),
                _ => None,
            })
            .collect()
    }
}

fn collect_entries<'a>(
    object: &'a BTreeMap<String, ConfigValue>,
    prefix: &str,
    entries: &mut Vec<(String, &'a ConfigValue)>,
) {
    for (key, value) in object {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            ConfigValue::Null => {}
            ConfigValue::Object(children) => collect_entries(children, &path, entries),
            _ => entries.push((path, value)),
        }
    }
}

fn parse_number(text: &str) -> Option<Number> {
    text.parse::<i64>()
        .map(Number::Integer)
        .or_else(|_| text.parse::<f64>().map(Number::Float))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigTree {
        ConfigTree::from_json_str(
            r#"{
                "db": {"url": "jdbc:x", "max-active": 20, "ratio": 0.5, "flag": "yes", "port": "5432"},
                "cache": {"nodes": ["a", "b"], "empty": null},
                "loose": 1
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_has_path_is_distinct_from_get() {
        let tree = sample();
        assert!(tree.has_path("db.url"));
        assert!(!tree.has_path("db.URL"), "paths are case-sensitive");
        assert!(!tree.has_path("cache.empty"), "null counts as absent");
        assert!(!tree.has_path("db.url.deeper"));
        assert!(matches!(
            tree.get_value("db.missing"),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_typed_getters_convert() {
        let tree = sample();
        assert_eq!(tree.get_int("db.max-active").unwrap(), 20);
        assert_eq!(tree.get_string("db.max-active").unwrap(), "20");
        assert_eq!(tree.get_int("db.port").unwrap(), 5432);
        assert!(tree.get_bool("db.flag").unwrap());
        assert_eq!(tree.get_double("db.ratio").unwrap(), 0.5);
        assert_eq!(tree.get_list("cache.nodes").unwrap().len(), 2);
    }

    #[test]
    fn test_typed_getters_reject() {
        let tree = sample();
        assert!(matches!(
            tree.get_int("db.url"),
            Err(ConfigError::BadValue { .. })
        ));
        assert!(matches!(
            tree.get_string("cache.nodes"),
            Err(ConfigError::WrongType { .. })
        ));
        let big = ConfigTree::new().with_value("n", 5_000_000_000_i64);
        assert!(matches!(big.get_int("n"), Err(ConfigError::OutOfRange { .. })));
    }

    #[test]
    fn test_entries_and_roots() {
        let tree = sample();
        let paths: Vec<String> = tree.entries().into_iter().map(|(path, _)| path).collect();
        assert!(paths.contains(&"db.max-active".to_owned()));
        assert!(paths.contains(&"cache.nodes".to_owned()));
        assert!(!paths.contains(&"cache.empty".to_owned()));
        let roots: Vec<String> = tree.roots().into_iter().collect();
        assert_eq!(roots, vec!["cache".to_owned(), "db".to_owned()]);
    }

    #[test]
    fn test_from_entries_nests_dotted_paths() {
        let tree = ConfigTree::from_entries([("db.url", ConfigValue::from("jdbc:x")), ("db.max-active", 20.into())]);
        assert_eq!(tree.get_string("db.url").unwrap(), "jdbc:x");
        let db = tree.get_tree("db").unwrap();
        assert_eq!(db.get_int("max-active").unwrap(), 20);
    }

    #[test]
    fn test_with_value_replaces_scalars_on_the_way() {
        let tree = ConfigTree::new().with_value("a", 1).with_value("a.b", "x");
        assert_eq!(tree.get_string("a.b").unwrap(), "x");
    }
}
