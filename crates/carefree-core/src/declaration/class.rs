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

use super::cache::DeclarationMemo;
use crate::archetype::{PropertyError, PropertyKind, PropertyType, PropertyValue};
use crate::config::ConfigValue;
use crate::Archetype;
use std::fmt;
use std::sync::Arc;

/// How realized instances of a declaration are shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One instance per class name for the lifetime of the singleton cache.
    #[default]
    Singleton,
    /// One instance per declaration.
    Declaration,
    /// A new instance on every call.
    Prototype,
}

impl Scope {
    /// Parses a scope name case-insensitively. Unknown names mean [`Scope::Singleton`].
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("prototype") {
            Scope::Prototype
        } else if name.eq_ignore_ascii_case("declaration") {
            Scope::Declaration
        } else {
            Scope::Singleton
        }
    }

    /// The canonical lower-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Singleton => "singleton",
            Scope::Declaration => "declaration",
            Scope::Prototype => "prototype",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PropertyType for Scope {
    const KIND: PropertyKind = PropertyKind::Opaque;

    fn into_property(self) -> PropertyValue {
        PropertyValue::Opaque(ConfigValue::String(self.as_str().to_owned()))
    }

    fn from_property(value: PropertyValue) -> Result<Self, PropertyError> {
        let PropertyValue::Opaque(raw) = value else {
            return Err(PropertyError::mismatch(Self::KIND, &value));
        };
        raw.render()
            .map(|name| Scope::parse(&name))
            .ok_or_else(|| PropertyError::Invalid(format!("a scope cannot be a {}", raw.type_name())))
    }
}

/// A configuration-described recipe for building an object.
///
/// The declaration names a registered class, how to construct it (a
/// constructor, or a static factory when `static_factory_method` is set),
/// an optional initializer to run on the product, and a [`Scope`].
///
/// Clones share the declaration-scope memo: they are the same declaration.
/// A declaration freshly bound from configuration starts with an empty memo.
#[derive(Debug, Clone, Default, Archetype)]
pub struct ClassDeclaration {
    /// The registered class name.
    pub class_name: Option<String>,
    /// Constructor arguments.
    pub constructor_args: Option<Vec<ConfigValue>>,
    /// Name of a static factory used instead of a constructor.
    pub static_factory_method: Option<String>,
    /// Static factory arguments.
    pub static_factory_args: Option<Vec<ConfigValue>>,
    /// Name of an initializer run on the product.
    pub initialize_method: Option<String>,
    /// Initializer arguments.
    pub initialize_args: Option<Vec<ConfigValue>>,
    /// Instance sharing; unset means [`Scope::Singleton`].
    pub scope: Option<Scope>,
    /// The token of a `DEFINED(<token>)` reference.
    pub defined_value: Option<String>,
    #[archetype(skip)]
    memo: Arc<DeclarationMemo>,
}

impl ClassDeclaration {
    /// Declares the class `class_name` with no arguments.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            ..Default::default()
        }
    }

    /// Interprets a plain string value: `DEFINED(<token>)` (any case, outer
    /// whitespace ignored) yields a defined-value reference, anything else
    /// is a class name.
    pub fn from_reference(text: &str) -> Self {
        let trimmed = text.trim();
        let is_defined = trimmed.len() >= "DEFINED()".len()
            && trimmed
                .get(..8)
                .is_some_and(|head| head.eq_ignore_ascii_case("DEFINED("))
            && trimmed.ends_with(')');
        if is_defined {
            Self {
                defined_value: Some(trimmed[8..trimmed.len() - 1].to_owned()),
                ..Default::default()
            }
        } else {
            Self {
                class_name: Some(text.to_owned()),
                ..Default::default()
            }
        }
    }

    /// Sets the constructor arguments.
    pub fn with_constructor_args(mut self, args: Vec<ConfigValue>) -> Self {
        self.constructor_args = Some(args);
        self
    }

    /// Builds through the static factory `method` instead of a constructor.
    pub fn with_static_factory(mut self, method: impl Into<String>, args: Vec<ConfigValue>) -> Self {
        self.static_factory_method = Some(method.into());
        self.static_factory_args = Some(args);
        self
    }

    /// Runs the initializer `method` on the product.
    pub fn with_initializer(mut self, method: impl Into<String>, args: Vec<ConfigValue>) -> Self {
        self.initialize_method = Some(method.into());
        self.initialize_args = Some(args);
        self
    }

    /// Sets the scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// The class name, if it is not blank.
    pub fn class_name(&self) -> Option<&str> {
        non_blank(self.class_name.as_deref())
    }

    /// The `DEFINED(<token>)` token, if this declaration is one.
    pub fn defined_value(&self) -> Option<&str> {
        self.defined_value.as_deref()
    }

    /// The scope, defaulting to [`Scope::Singleton`].
    pub fn effective_scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    /// Returns `true` if realizing this declaration yields nothing.
    pub fn is_inert(&self) -> bool {
        self.class_name().is_none()
    }

    pub(crate) fn static_factory(&self) -> Option<&str> {
        non_blank(self.static_factory_method.as_deref())
    }

    pub(crate) fn initializer(&self) -> Option<&str> {
        non_blank(self.initialize_method.as_deref())
    }

    pub(crate) fn memo(&self) -> &DeclarationMemo {
        &self.memo
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

pub(crate) fn args(values: &Option<Vec<ConfigValue>>) -> &[ConfigValue] {
    values.as_deref().unwrap_or_default()
}
