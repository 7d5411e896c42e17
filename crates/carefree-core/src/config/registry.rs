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

//! A holder for configuration trees loaded under distinct keys.

use super::ConfigTree;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe map from a configuration key (typically the file stem it was
/// loaded from, e.g. `"datasource"`) to its tree.
///
/// Registering a key twice replaces the earlier tree.
#[derive(Debug, Default)]
pub struct ConfigRegistry {
    trees: RwLock<HashMap<String, Arc<ConfigTree>>>,
}

impl ConfigRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tree` under `key`.
    pub fn register(&self, key: impl Into<String>, tree: ConfigTree) {
        let key = key.into();
        log::debug!("Registering configuration tree '{key}'");
        self.trees
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(tree));
    }

    /// Returns the tree registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<ConfigTree>> {
        self.trees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// All registered keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .trees
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Returns the number of registered trees.
    pub fn len(&self) -> usize {
        self.trees.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no tree is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let registry = ConfigRegistry::new();
        registry.register("redis", ConfigTree::new().with_value("main.host", "localhost"));

        let tree = registry.get("redis").unwrap();
        assert_eq!(tree.get_string("main.host").unwrap(), "localhost");
        assert!(registry.get("druid").is_none());
    }

    #[test]
    fn test_replace_tree() {
        let registry = ConfigRegistry::new();
        registry.register("redis", ConfigTree::new().with_value("a.b", 1));
        registry.register("redis", ConfigTree::new().with_value("a.b", 2));
        registry.register("druid", ConfigTree::new());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.keys(), vec!["druid".to_owned(), "redis".to_owned()]);
        assert_eq!(registry.get("redis").unwrap().get_int("a.b").unwrap(), 2);
    }
}
