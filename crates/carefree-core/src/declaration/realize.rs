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

use super::cache::{Instance, SingletonCache};
use super::class::{args, ClassDeclaration};
use super::{ClassRegistry, InstantiationError, Scope};
use std::any::{type_name, Any};
use std::sync::Arc;

/// Turns [`ClassDeclaration`]s into live objects.
///
/// The singleton cache is injected so that independent realizers (tests,
/// separate host contexts) can keep independent singletons, or share them
/// by sharing the cache.
#[derive(Debug, Clone)]
pub struct Realizer {
    registry: Arc<ClassRegistry>,
    singletons: Arc<SingletonCache>,
}

impl Realizer {
    /// Creates a realizer over `registry` that caches singletons in `singletons`.
    pub fn new(registry: Arc<ClassRegistry>, singletons: Arc<SingletonCache>) -> Self {
        Self {
            registry,
            singletons,
        }
    }

    /// The class registry.
    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    /// The singleton cache.
    pub fn singletons(&self) -> &Arc<SingletonCache> {
        &self.singletons
    }

    /// Realizes `declaration` as a `T`.
    ///
    /// Returns `Ok(None)` if the declaration has a blank class name.
    ///
    /// # Errors
    ///
    /// Any lookup or invocation failure, and [`InstantiationError::TypeMismatch`]
    /// if the realized object is not a `T`.
    pub fn realize<T: Any + Send + Sync>(
        &self,
        declaration: &ClassDeclaration,
    ) -> Result<Option<Arc<T>>, InstantiationError> {
        let Some(instance) = self.realize_any(declaration)? else {
            return Ok(None);
        };
        instance
            .downcast::<T>()
            .map(Some)
            .map_err(|_| InstantiationError::TypeMismatch {
                class_name: declaration.class_name().unwrap_or_default().to_owned(),
                expected: type_name::<T>(),
            })
    }

    /// Realizes `declaration` without naming the product type.
    pub fn realize_any(
        &self,
        declaration: &ClassDeclaration,
    ) -> Result<Option<Instance>, InstantiationError> {
        let Some(class_name) = declaration.class_name() else {
            log::debug!("Skipping a class declaration without class name");
            return Ok(None);
        };

        let instance = match declaration.effective_scope() {
            Scope::Prototype => self.construct(class_name, declaration)?,
            Scope::Declaration => declaration
                .memo()
                .get_or_try_init(class_name, || self.construct(class_name, declaration))?,
            Scope::Singleton => self
                .singletons
                .get_or_try_insert_with(class_name, || self.construct(class_name, declaration))?,
        };
        Ok(Some(instance))
    }

    fn construct(
        &self,
        class_name: &str,
        declaration: &ClassDeclaration,
    ) -> Result<Instance, InstantiationError> {
        let entry = self
            .registry
            .entry(class_name)
            .ok_or_else(|| InstantiationError::ClassNotFound {
                class_name: class_name.to_owned(),
            })?;

        let mut product = match declaration.static_factory() {
            Some(method) => {
                entry.call_factory(class_name, method, args(&declaration.static_factory_args))?
            }
            None => entry.construct(class_name, args(&declaration.constructor_args))?,
        };

        if let Some(method) = declaration.initializer() {
            entry.call_initializer(
                class_name,
                method,
                args(&declaration.initialize_args),
                product.as_mut(),
            )?;
        }

        log::debug!(
            "Realized class '{class_name}' ({} scope)",
            declaration.effective_scope()
        );
        Ok(Arc::from(product))
    }
}
