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

//! Compile-time reflection over configuration-shaped structs.
//!
//! An archetype is a plain struct of `Option<_>` fields. `#[derive(Archetype)]`
//! lists those fields as [`PropertyDescriptor`]s, each carrying a typed
//! accessor and mutator, which is all the binder and the reference resolver
//! need to work over any archetype generically.

mod introspect;
mod property;

pub use introspect::{evict, introspect, introspect_until, Introspection, NoStop};
pub use property::{PropertyDescriptor, PropertyError, PropertyKind, PropertyType, PropertyValue};

/// A record type whose properties can be bound from configuration.
///
/// Implement it with `#[derive(Archetype)]`.
pub trait Archetype: Default + Clone + Send + Sync + 'static {
    /// Returns the settable properties of the type, in declaration order.
    ///
    /// Prefer [`introspect`], which caches the result.
    fn properties() -> Vec<PropertyDescriptor<Self>>;
}
