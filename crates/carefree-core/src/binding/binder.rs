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

//! Populates archetypes from a configuration tree.

use super::error::BindingError;
use super::path;
use crate::archetype::{introspect, Archetype, PropertyDescriptor, PropertyKind, PropertyValue};
use crate::config::{ConfigError, ConfigTree, ConfigValue};
use crate::declaration::ClassDeclaration;
use std::any::type_name;
use std::collections::BTreeMap;

/// Binds every resolvable property of `target` from `tree`.
///
/// Properties are looked up under `prefix` first and `default_prefix`
/// second (see [`path::resolve`]). Unresolved properties, and properties
/// whose value is the force-default sentinel, keep their current value.
///
/// The bind is all-or-nothing: on error `target` is left untouched.
pub fn bind<T: Archetype>(
    target: &mut T,
    tree: &ConfigTree,
    prefix: Option<&str>,
    default_prefix: Option<&str>,
) -> Result<(), BindingError> {
    let introspection = introspect::<T>();
    let mut staged = target.clone();
    for property in introspection.properties() {
        bind_property(property, &mut staged, tree, prefix, default_prefix)?;
    }
    *target = staged;
    Ok(())
}

/// Creates a `T::default()` and binds it from `tree`.
pub fn from_config<T: Archetype>(
    tree: &ConfigTree,
    prefix: Option<&str>,
    default_prefix: Option<&str>,
) -> Result<T, BindingError> {
    let mut target = T::default();
    bind(&mut target, tree, prefix, default_prefix)?;
    Ok(target)
}

fn bind_property<T: 'static>(
    property: &PropertyDescriptor<T>,
    target: &mut T,
    tree: &ConfigTree,
    prefix: Option<&str>,
    default_prefix: Option<&str>,
) -> Result<(), BindingError> {
    let names = [property.name(), property.kebab_name(), property.snake_name()];
    let Some(path) = path::resolve_variants(names, prefix, default_prefix, tree) else {
        return Ok(());
    };

    let coercion = |source: ConfigError| BindingError::Coercion {
        archetype: type_name::<T>(),
        property: property.name().to_owned(),
        path: path.clone(),
        source,
    };

    let raw = tree.get_value(&path).map_err(coercion)?;
    if path::is_force_default(raw) {
        log::debug!("Property '{}' forced to its default by '{path}'", property.name());
        return Ok(());
    }

    let value = match property.kind() {
        PropertyKind::String => PropertyValue::String(tree.get_string(&path).map_err(coercion)?),
        // Narrow widths wrap, the way a boxed number's byteValue/shortValue do.
        PropertyKind::I8 => PropertyValue::I8(tree.get_number(&path).map_err(coercion)?.as_i64() as i8),
        PropertyKind::I16 => {
            PropertyValue::I16(tree.get_number(&path).map_err(coercion)?.as_i64() as i16)
        }
        PropertyKind::I32 => PropertyValue::I32(tree.get_int(&path).map_err(coercion)?),
        PropertyKind::I64 => PropertyValue::I64(tree.get_long(&path).map_err(coercion)?),
        PropertyKind::F32 => {
            PropertyValue::F32(tree.get_number(&path).map_err(coercion)?.as_f64() as f32)
        }
        PropertyKind::F64 => PropertyValue::F64(tree.get_double(&path).map_err(coercion)?),
        PropertyKind::Bool => PropertyValue::Bool(tree.get_bool(&path).map_err(coercion)?),
        PropertyKind::Char => {
            let text = tree.get_string(&path).map_err(coercion)?;
            let first = text.chars().next().ok_or_else(|| {
                coercion(ConfigError::BadValue {
                    path: path.clone(),
                    expected: "character",
                    value: text.clone(),
                })
            })?;
            PropertyValue::Char(first)
        }
        PropertyKind::Array => PropertyValue::Array(tree.get_list(&path).map_err(coercion)?.to_vec()),
        // The whole tree being bound, not just the matched leaf.
        PropertyKind::Map => PropertyValue::Map(
            tree.entries()
                .into_iter()
                .map(|(key, value)| (key, value.clone()))
                .collect::<BTreeMap<_, _>>(),
        ),
        PropertyKind::Declaration => {
            PropertyValue::Declaration(bind_declaration::<T>(property, &path, raw)?)
        }
        PropertyKind::Opaque => PropertyValue::Opaque(raw.clone()),
    };

    property
        .set(target, value)
        .map_err(|source| BindingError::Property {
            archetype: type_name::<T>(),
            property: property.name().to_owned(),
            path: path.clone(),
            source,
        })?;
    log::debug!("Bound property '{}' from '{path}'", property.name());
    Ok(())
}

fn bind_declaration<T: 'static>(
    property: &PropertyDescriptor<T>,
    path: &str,
    raw: &ConfigValue,
) -> Result<ClassDeclaration, BindingError> {
    match raw {
        ConfigValue::String(text) => Ok(ClassDeclaration::from_reference(text)),
        ConfigValue::Object(object) => {
            let subtree = ConfigTree::from_object(object.clone());
            from_config::<ClassDeclaration>(&subtree, None, None).map_err(|source| {
                BindingError::Nested {
                    archetype: type_name::<T>(),
                    property: property.name().to_owned(),
                    path: path.to_owned(),
                    source: Box::new(source),
                }
            })
        }
        other => Err(BindingError::Declaration {
            archetype: type_name::<T>(),
            property: property.name().to_owned(),
            path: path.to_owned(),
            found: other.type_name(),
        }),
    }
}
