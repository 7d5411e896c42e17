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

use super::error::BindingError;
use crate::archetype::{introspect, Archetype};
use std::any::type_name;

/// Copies every property that is unset on `target` and set on `reference`.
///
/// Set values on `target` are never overwritten; zero and empty values count
/// as set. Write-only properties are skipped. Only the top-level properties
/// of `T` are compared; nested values are copied whole.
pub fn apply_reference<T: Archetype>(target: &mut T, reference: &T) -> Result<(), BindingError> {
    let introspection = introspect::<T>();
    for property in introspection.properties() {
        if !property.is_readable() || property.get(target).is_some() {
            continue;
        }
        let Some(value) = property.get(reference) else {
            continue;
        };
        property
            .set(target, value)
            .map_err(|source| BindingError::Reference {
                archetype: type_name::<T>(),
                property: property.name().to_owned(),
                source,
            })?;
        log::trace!("Inherited property '{}' from reference", property.name());
    }
    Ok(())
}
