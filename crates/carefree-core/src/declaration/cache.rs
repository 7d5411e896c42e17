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

//! Instance caches for the singleton and declaration scopes.

use super::InstantiationError;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

/// A realized object, type-erased.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Records which thread is running a build, so that the same thread asking
/// for the value again fails instead of waiting on itself.
#[derive(Debug, Default)]
struct BuildMark {
    builder: Mutex<Option<ThreadId>>,
}

impl BuildMark {
    fn held_by_current(&self) -> bool {
        *self.builder.lock().unwrap_or_else(PoisonError::into_inner) == Some(thread::current().id())
    }

    fn enter(&self) -> BuildGuard<'_> {
        *self.builder.lock().unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        BuildGuard(self)
    }
}

/// Clears the mark on drop, unwinding included.
struct BuildGuard<'a>(&'a BuildMark);

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        *self.0.builder.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[derive(Debug, Default)]
struct Slot {
    value: Mutex<Option<Instance>>,
    mark: BuildMark,
}

/// The class-name keyed cache backing [`Scope::Singleton`](super::Scope::Singleton).
///
/// The first successful construction for a class name is kept for the
/// lifetime of the cache and returned to every later caller, whatever
/// arguments their declaration carries. Failed constructions are not cached.
///
/// Construction runs under a lock owned by the class name's slot, so racing
/// callers build at most once per class and distinct classes never wait on
/// each other. A build that asks for its own class name again fails with
/// [`InstantiationError::RecursiveConstruction`].
#[derive(Debug, Default)]
pub struct SingletonCache {
    slots: Mutex<HashMap<String, Arc<Slot>>>,
}

impl SingletonCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the instance cached for `class_name`.
    pub fn get(&self, class_name: &str) -> Option<Instance> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(class_name)
            .cloned()?;
        let cached = slot.value.lock().unwrap_or_else(PoisonError::into_inner).clone();
        cached
    }

    /// Returns the instance cached for `class_name`, building it with `build`
    /// if there is none yet.
    pub fn get_or_try_insert_with(
        &self,
        class_name: &str,
        build: impl FnOnce() -> Result<Instance, InstantiationError>,
    ) -> Result<Instance, InstantiationError> {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(class_name.to_owned())
            .or_default()
            .clone();

        if slot.mark.held_by_current() {
            return Err(InstantiationError::RecursiveConstruction {
                class_name: class_name.to_owned(),
            });
        }

        let mut cached = slot.value.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = cached.as_ref() {
            log::debug!("Singleton cache hit for '{class_name}'");
            return Ok(instance.clone());
        }
        log::debug!("Singleton cache miss for '{class_name}'");
        let built = {
            let _guard = slot.mark.enter();
            build()
        };
        match built {
            Ok(instance) => {
                *cached = Some(instance.clone());
                Ok(instance)
            }
            Err(err) => {
                drop(cached);
                self.discard_if_unused(class_name, &slot);
                Err(err)
            }
        }
    }

    // Only the map and the failed caller hold the slot: nobody is waiting on
    // it, and new waiters need the map lock held here to find it.
    fn discard_if_unused(&self, class_name: &str, slot: &Arc<Slot>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = slots
            .get(class_name)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
        if unused {
            slots.remove(class_name);
        }
    }

    /// Number of class names with a cached instance.
    pub fn len(&self) -> usize {
        let slots: Vec<Arc<Slot>> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        slots
            .iter()
            .filter(|slot| slot.value.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The per-declaration memo backing [`Scope::Declaration`](super::Scope::Declaration).
#[derive(Debug, Default)]
pub(crate) struct DeclarationMemo {
    value: OnceLock<Instance>,
    lock: Mutex<()>,
    mark: BuildMark,
}

impl DeclarationMemo {
    pub(crate) fn get_or_try_init(
        &self,
        class_name: &str,
        build: impl FnOnce() -> Result<Instance, InstantiationError>,
    ) -> Result<Instance, InstantiationError> {
        if let Some(instance) = self.value.get() {
            return Ok(instance.clone());
        }
        if self.mark.held_by_current() {
            return Err(InstantiationError::RecursiveConstruction {
                class_name: class_name.to_owned(),
            });
        }
        let _lock = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = self.value.get() {
            return Ok(instance.clone());
        }
        let instance = {
            let _guard = self.mark.enter();
            build()?
        };
        // Only the lock holder sets the cell.
        let _ = self.value.set(instance.clone());
        Ok(instance)
    }
}
