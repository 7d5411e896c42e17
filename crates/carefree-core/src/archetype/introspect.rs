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

//! Process-wide memoization of archetype property metadata.

use super::{Archetype, PropertyDescriptor};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// Marker stop type meaning "keep every property".
pub enum NoStop {}

/// The settable properties of an archetype `T`, in declaration order.
#[derive(Debug)]
pub struct Introspection<T> {
    properties: Vec<PropertyDescriptor<T>>,
}

impl<T> Introspection<T> {
    /// All properties.
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    /// Looks a property up by its logical (camelCase) name.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.properties.iter().find(|property| property.name() == name)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the archetype has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

type CacheKey = (TypeId, TypeId);

// Entries are pure functions of their key, so a racing recomputation only
// costs time. Types are never unloaded, so nothing goes stale on its own.
static CACHE: LazyLock<RwLock<HashMap<CacheKey, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns every property of `T`.
pub fn introspect<T: Archetype>() -> Arc<Introspection<T>> {
    introspect_until::<T, NoStop>()
}

/// Returns the properties of `T`, leaving out those declared through the
/// embedded archetype `S`.
///
/// The result is computed once per `(T, S)` and shared until [`evict`]ed.
pub fn introspect_until<T: Archetype, S: 'static>() -> Arc<Introspection<T>> {
    let key = (TypeId::of::<T>(), TypeId::of::<S>());

    let cached = CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
        .cloned();
    if let Some(hit) = cached.and_then(|any| any.downcast::<Introspection<T>>().ok()) {
        return hit;
    }

    log::trace!(
        "Introspecting archetype {} (stop at {})",
        std::any::type_name::<T>(),
        std::any::type_name::<S>()
    );
    let stop = TypeId::of::<S>();
    let properties = T::properties()
        .into_iter()
        .filter(|property| !property.lineage().contains(&stop))
        .collect();
    let fresh = Arc::new(Introspection { properties });

    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    // A racing thread may have won; keep its entry so every caller shares one.
    let entry = cache
        .entry(key)
        .or_insert_with(|| fresh.clone() as Arc<dyn Any + Send + Sync>)
        .clone();
    drop(cache);
    entry.downcast::<Introspection<T>>().unwrap_or(fresh)
}

/// Drops every cached introspection of `T`, whatever its stop type.
///
/// Handles already returned stay valid; the next lookup recomputes.
/// Returns the number of entries removed.
pub fn evict<T: 'static>() -> usize {
    let target = TypeId::of::<T>();
    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    let before = cache.len();
    cache.retain(|(archetype, _), _| *archetype != target);
    let removed = before - cache.len();
    if removed > 0 {
        log::debug!("Evicted {removed} introspection(s) of {}", std::any::type_name::<T>());
    }
    removed
}
