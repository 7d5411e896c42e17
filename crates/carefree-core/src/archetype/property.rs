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

//! Property metadata: semantic types, values and descriptors.

use crate::config::ConfigValue;
use crate::declaration::ClassDeclaration;
use crate::naming;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// The semantic type of a property, which selects how a raw configuration
/// value is coerced before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// Text.
    String,
    /// 8-bit integer, narrowed from the configured number.
    I8,
    /// 16-bit integer, narrowed from the configured number.
    I16,
    /// 32-bit integer, range-checked.
    I32,
    /// 64-bit integer.
    I64,
    /// Single precision float.
    F32,
    /// Double precision float.
    F64,
    /// Boolean.
    Bool,
    /// The first character of the configured text.
    Char,
    /// A list of raw values.
    Array,
    /// A map built from every entry of the tree being bound.
    Map,
    /// A [`ClassDeclaration`].
    Declaration,
    /// Any other type; receives the raw value unchanged.
    Opaque,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyKind::String => "string",
            PropertyKind::I8 => "i8",
            PropertyKind::I16 => "i16",
            PropertyKind::I32 => "i32",
            PropertyKind::I64 => "i64",
            PropertyKind::F32 => "f32",
            PropertyKind::F64 => "f64",
            PropertyKind::Bool => "boolean",
            PropertyKind::Char => "char",
            PropertyKind::Array => "array",
            PropertyKind::Map => "map",
            PropertyKind::Declaration => "class declaration",
            PropertyKind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// A coerced property value, tagged with its [`PropertyKind`].
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// See [`PropertyKind::String`].
    String(String),
    /// See [`PropertyKind::I8`].
    I8(i8),
    /// See [`PropertyKind::I16`].
    I16(i16),
    /// See [`PropertyKind::I32`].
    I32(i32),
    /// See [`PropertyKind::I64`].
    I64(i64),
    /// See [`PropertyKind::F32`].
    F32(f32),
    /// See [`PropertyKind::F64`].
    F64(f64),
    /// See [`PropertyKind::Bool`].
    Bool(bool),
    /// See [`PropertyKind::Char`].
    Char(char),
    /// See [`PropertyKind::Array`].
    Array(Vec<ConfigValue>),
    /// See [`PropertyKind::Map`].
    Map(BTreeMap<String, ConfigValue>),
    /// See [`PropertyKind::Declaration`].
    Declaration(ClassDeclaration),
    /// See [`PropertyKind::Opaque`].
    Opaque(ConfigValue),
}

impl PropertyValue {
    /// The kind this value was coerced to.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::I8(_) => PropertyKind::I8,
            PropertyValue::I16(_) => PropertyKind::I16,
            PropertyValue::I32(_) => PropertyKind::I32,
            PropertyValue::I64(_) => PropertyKind::I64,
            PropertyValue::F32(_) => PropertyKind::F32,
            PropertyValue::F64(_) => PropertyKind::F64,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Char(_) => PropertyKind::Char,
            PropertyValue::Array(_) => PropertyKind::Array,
            PropertyValue::Map(_) => PropertyKind::Map,
            PropertyValue::Declaration(_) => PropertyKind::Declaration,
            PropertyValue::Opaque(_) => PropertyKind::Opaque,
        }
    }
}

/// An error raised when a coerced value cannot be stored in a field.
#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    /// The value was coerced to a different kind than the field declares.
    #[error("expected a {expected} value, found {found}")]
    KindMismatch {
        /// The field's kind.
        expected: PropertyKind,
        /// The kind of the value offered.
        found: PropertyKind,
    },
    /// The value has the right kind but its content is unusable.
    #[error("{0}")]
    Invalid(String),
}

impl PropertyError {
    /// Shorthand for a [`PropertyError::KindMismatch`] against `value`.
    pub fn mismatch(expected: PropertyKind, value: &PropertyValue) -> Self {
        PropertyError::KindMismatch {
            expected,
            found: value.kind(),
        }
    }
}

/// A Rust type that can be stored in an archetype property.
///
/// `#[derive(Archetype)]` requires every property field to be `Option<T>`
/// with `T: PropertyType`. Implement it for your own types with
/// [`PropertyKind::Opaque`] to receive the raw configuration value.
pub trait PropertyType: Clone + Send + Sync + Sized + 'static {
    /// How raw configuration values are coerced for this type.
    const KIND: PropertyKind;

    /// Wraps a field value for reading.
    fn into_property(self) -> PropertyValue;

    /// Unwraps a coerced value for writing.
    fn from_property(value: PropertyValue) -> Result<Self, PropertyError>;
}

macro_rules! scalar_property_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl PropertyType for $ty {
                const KIND: PropertyKind = PropertyKind::$variant;

                fn into_property(self) -> PropertyValue {
                    PropertyValue::$variant(self)
                }

                fn from_property(value: PropertyValue) -> Result<Self, PropertyError> {
                    match value {
                        PropertyValue::$variant(inner) => Ok(inner),
                        other => Err(PropertyError::mismatch(Self::KIND, &other)),
                    }
                }
            }
        )*
    };
}

scalar_property_type! {
    String => String,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    bool => Bool,
    char => Char,
    Vec<ConfigValue> => Array,
    BTreeMap<String, ConfigValue> => Map,
    ClassDeclaration => Declaration,
}

impl PropertyType for HashMap<String, ConfigValue> {
    const KIND: PropertyKind = PropertyKind::Map;

    fn into_property(self) -> PropertyValue {
        PropertyValue::Map(self.into_iter().collect())
    }

    fn from_property(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Map(entries) => Ok(entries.into_iter().collect()),
            other => Err(PropertyError::mismatch(Self::KIND, &other)),
        }
    }
}

impl PropertyType for ConfigValue {
    const KIND: PropertyKind = PropertyKind::Opaque;

    fn into_property(self) -> PropertyValue {
        PropertyValue::Opaque(self)
    }

    fn from_property(value: PropertyValue) -> Result<Self, PropertyError> {
        match value {
            PropertyValue::Opaque(inner) => Ok(inner),
            other => Err(PropertyError::mismatch(Self::KIND, &other)),
        }
    }
}

/// A list of strings, e.g. node addresses or init statements. Scalars in the
/// list are rendered as text.
impl PropertyType for Vec<String> {
    const KIND: PropertyKind = PropertyKind::Opaque;

    fn into_property(self) -> PropertyValue {
        PropertyValue::Opaque(ConfigValue::List(
            self.into_iter().map(ConfigValue::String).collect(),
        ))
    }

    fn from_property(value: PropertyValue) -> Result<Self, PropertyError> {
        let PropertyValue::Opaque(raw) = value else {
            return Err(PropertyError::mismatch(Self::KIND, &value));
        };
        let items = raw.as_list().ok_or_else(|| {
            PropertyError::Invalid(format!("expected a list of strings, found {}", raw.type_name()))
        })?;
        items
            .iter()
            .map(|item| {
                item.render().ok_or_else(|| {
                    PropertyError::Invalid(format!(
                        "expected a list of strings, found a {} item",
                        item.type_name()
                    ))
                })
            })
            .collect()
    }
}

type Getter<T> = Arc<dyn Fn(&T) -> Option<PropertyValue> + Send + Sync>;
type Setter<T> = Arc<dyn Fn(&mut T, PropertyValue) -> Result<(), PropertyError> + Send + Sync>;

/// One settable property of an archetype `T`.
///
/// The three name variants the path resolver probes are computed once, here,
/// which is what makes caching introspection worthwhile.
pub struct PropertyDescriptor<T> {
    name: String,
    kebab: String,
    snake: String,
    kind: PropertyKind,
    lineage: Vec<TypeId>,
    getter: Option<Getter<T>>,
    setter: Setter<T>,
}

impl<T: 'static> PropertyDescriptor<T> {
    /// Describes the field `field` of `T`, holding an `Option<P>`.
    ///
    /// The property name is `rename` if given, otherwise the camelCase form
    /// of the field identifier.
    pub fn new<P: PropertyType>(
        field: &'static str,
        rename: Option<&'static str>,
        get: fn(&T) -> Option<PropertyValue>,
        set: fn(&mut T, PropertyValue) -> Result<(), PropertyError>,
    ) -> Self {
        let name = match rename {
            Some(name) => name.to_owned(),
            None => naming::from_snake(field),
        };
        Self {
            kebab: naming::to_kebab(&name),
            snake: naming::to_snake(&name),
            name,
            kind: P::KIND,
            lineage: vec![TypeId::of::<T>()],
            getter: Some(Arc::new(get)),
            setter: Arc::new(set),
        }
    }

    /// Drops the accessor, leaving a property that can be bound but not read.
    pub fn write_only(mut self) -> Self {
        self.getter = None;
        self
    }

    /// Re-targets this descriptor at an outer type `O` that stores a `T` by value.
    pub fn lift<O: 'static>(
        self,
        project: fn(&O) -> &T,
        project_mut: fn(&mut O) -> &mut T,
    ) -> PropertyDescriptor<O> {
        let getter = self.getter.map(|get| -> Getter<O> {
            Arc::new(move |outer: &O| get(project(outer)))
        });
        let set = self.setter;
        let mut lineage = Vec::with_capacity(self.lineage.len() + 1);
        lineage.push(TypeId::of::<O>());
        lineage.extend(self.lineage);
        PropertyDescriptor {
            name: self.name,
            kebab: self.kebab,
            snake: self.snake,
            kind: self.kind,
            lineage,
            getter,
            setter: Arc::new(move |outer: &mut O, value| set(project_mut(outer), value)),
        }
    }
}

impl<T> PropertyDescriptor<T> {
    /// The logical (camelCase) property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kebab-case form of the name.
    pub fn kebab_name(&self) -> &str {
        &self.kebab
    }

    /// The snake_case form of the name.
    pub fn snake_name(&self) -> &str {
        &self.snake
    }

    /// The semantic type of the property.
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// The archetype types this property was declared through, outermost first.
    pub fn lineage(&self) -> &[TypeId] {
        &self.lineage
    }

    /// Whether the property has an accessor.
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Reads the property; `None` if it is unset or has no accessor.
    pub fn get(&self, target: &T) -> Option<PropertyValue> {
        self.getter.as_ref().and_then(|get| get(target))
    }

    /// Writes the property.
    pub fn set(&self, target: &mut T, value: PropertyValue) -> Result<(), PropertyError> {
        (self.setter)(target, value)
    }
}

impl<T> Clone for PropertyDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kebab: self.kebab.clone(),
            snake: self.snake.clone(),
            kind: self.kind,
            lineage: self.lineage.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("readable", &self.getter.is_some())
            .finish()
    }
}
