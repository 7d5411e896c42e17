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

//! The registry of named classes that declarations can realize.
//!
//! A class is registered once, with a closure per constructor, static
//! factory and initializer. Each closure is keyed by a [`Signature`]: the
//! runtime types of the arguments it accepts. Realizing a declaration infers
//! the signature from the configured arguments and picks the exact match.

use super::InstantiationError;
use crate::config::{ConfigValue, Number};
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The runtime type of one argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgType {
    /// An explicit null.
    Null,
    /// A boolean.
    Boolean,
    /// An integer that fits in 32 bits.
    Integer,
    /// A wider integer.
    Long,
    /// A floating point number.
    Double,
    /// A string.
    String,
    /// A list.
    List,
    /// An object.
    Map,
}

impl ArgType {
    /// Infers the type of `value`.
    pub fn of(value: &ConfigValue) -> Self {
        match value {
            ConfigValue::Null => ArgType::Null,
            ConfigValue::Bool(_) => ArgType::Boolean,
            ConfigValue::Number(Number::Integer(value)) if i32::try_from(*value).is_ok() => {
                ArgType::Integer
            }
            ConfigValue::Number(Number::Integer(_)) => ArgType::Long,
            ConfigValue::Number(Number::Float(_)) => ArgType::Double,
            ConfigValue::String(_) => ArgType::String,
            ConfigValue::List(_) => ArgType::List,
            ConfigValue::Object(_) => ArgType::Map,
        }
    }
}

/// An ordered list of argument types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signature(Vec<ArgType>);

impl Signature {
    /// Creates a signature from explicit types.
    pub fn new(types: &[ArgType]) -> Self {
        Self(types.to_vec())
    }

    /// Infers the signature of an argument list.
    pub fn of(args: &[ConfigValue]) -> Self {
        Self(args.iter().map(ArgType::of).collect())
    }

    /// The argument types.
    pub fn types(&self) -> &[ArgType] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, arg) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg:?}")?;
        }
        f.write_str(")")
    }
}

type Product = Box<dyn Any + Send + Sync>;
type Construct = Arc<dyn Fn(&[ConfigValue]) -> anyhow::Result<Product> + Send + Sync>;
type Initialize =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync), &[ConfigValue]) -> anyhow::Result<()> + Send + Sync>;

/// Everything registered for one class.
#[derive(Default)]
pub(crate) struct ClassEntry {
    type_name: &'static str,
    constructors: HashMap<Signature, Construct>,
    factories: HashMap<(String, Signature), Construct>,
    initializers: HashMap<(String, Signature), Initialize>,
}

impl ClassEntry {
    pub(crate) fn construct(
        &self,
        class_name: &str,
        args: &[ConfigValue],
    ) -> Result<Product, InstantiationError> {
        let signature = Signature::of(args);
        let constructor =
            self.constructors
                .get(&signature)
                .ok_or_else(|| InstantiationError::NoSuchConstructor {
                    class_name: class_name.to_owned(),
                    signature: signature.clone(),
                })?;
        constructor(args).map_err(|source| InstantiationError::Invocation {
            class_name: class_name.to_owned(),
            member: format!("constructor {signature}"),
            source,
        })
    }

    pub(crate) fn call_factory(
        &self,
        class_name: &str,
        method: &str,
        args: &[ConfigValue],
    ) -> Result<Product, InstantiationError> {
        let key = (method.to_owned(), Signature::of(args));
        let factory = self.factories.get(&key).ok_or_else(|| no_such_method(class_name, &key))?;
        factory(args).map_err(|source| InstantiationError::Invocation {
            class_name: class_name.to_owned(),
            member: format!("static factory {}{}", key.0, key.1),
            source,
        })
    }

    pub(crate) fn call_initializer(
        &self,
        class_name: &str,
        method: &str,
        args: &[ConfigValue],
        product: &mut (dyn Any + Send + Sync),
    ) -> Result<(), InstantiationError> {
        let key = (method.to_owned(), Signature::of(args));
        let initializer = self
            .initializers
            .get(&key)
            .ok_or_else(|| no_such_method(class_name, &key))?;
        initializer(product, args).map_err(|source| InstantiationError::Invocation {
            class_name: class_name.to_owned(),
            member: format!("initializer {}{}", key.0, key.1),
            source,
        })
    }
}

fn no_such_method(class_name: &str, key: &(String, Signature)) -> InstantiationError {
    InstantiationError::NoSuchMethod {
        class_name: class_name.to_owned(),
        method: key.0.clone(),
        signature: key.1.clone(),
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassEntry")
            .field("type_name", &self.type_name)
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .field("initializers", &self.initializers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Describes a class backed by the Rust type `T`.
///
/// ```
/// use carefree_core::{ClassBuilder, ClassRegistry};
///
/// struct Greeter { greeting: String }
///
/// let mut registry = ClassRegistry::new();
/// registry.register(
///     ClassBuilder::<Greeter>::new("demo.Greeter")
///         .constructor(&[], |_| Ok(Greeter { greeting: "hello".into() }))
///         .initializer("shout", &[], |greeter, _| {
///             greeter.greeting.make_ascii_uppercase();
///             Ok(())
///         }),
/// );
/// assert!(registry.contains("demo.Greeter"));
/// ```
pub struct ClassBuilder<T> {
    class_name: String,
    entry: ClassEntry,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    /// Starts describing the class `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            entry: ClassEntry {
                type_name: type_name::<T>(),
                ..Default::default()
            },
            _marker: PhantomData,
        }
    }

    /// Adds a constructor taking arguments of the given types.
    pub fn constructor<F>(mut self, signature: &[ArgType], build: F) -> Self
    where
        F: Fn(&[ConfigValue]) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        let construct: Construct =
            Arc::new(move |args: &[ConfigValue]| Ok(Box::new(build(args)?) as Product));
        self.entry
            .constructors
            .insert(Signature::new(signature), construct);
        self
    }

    /// Adds a static factory. Its product may be of any type.
    pub fn static_factory<U, F>(mut self, method: &str, signature: &[ArgType], build: F) -> Self
    where
        U: Any + Send + Sync,
        F: Fn(&[ConfigValue]) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        let construct: Construct =
            Arc::new(move |args: &[ConfigValue]| Ok(Box::new(build(args)?) as Product));
        self.entry
            .factories
            .insert((method.to_owned(), Signature::new(signature)), construct);
        self
    }

    /// Adds an initializer run on a `T` product after construction.
    pub fn initializer<F>(mut self, method: &str, signature: &[ArgType], init: F) -> Self
    where
        F: Fn(&mut T, &[ConfigValue]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let initialize: Initialize = Arc::new(
            move |product: &mut (dyn Any + Send + Sync), args: &[ConfigValue]| {
                let target = product.downcast_mut::<T>().ok_or_else(|| {
                    anyhow::anyhow!("the initializer expects a {}", type_name::<T>())
                })?;
                init(target, args)
            },
        );
        self.entry
            .initializers
            .insert((method.to_owned(), Signature::new(signature)), initialize);
        self
    }
}

/// A set of registered classes, keyed by class name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassEntry>,
}

/// A registration submitted with [`inventory::submit!`] and picked up by
/// [`ClassRegistry::with_registered`].
///
/// ```ignore
/// inventory::submit! {
///     carefree_core::ClassRegistration(|registry| {
///         registry.register(ClassBuilder::<Codec>::new("codec.Json").constructor(&[], |_| Ok(Codec)));
///     })
/// }
/// ```
pub struct ClassRegistration(pub fn(&mut ClassRegistry));

inventory::collect!(ClassRegistration);

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every submitted [`ClassRegistration`].
    pub fn with_registered() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<ClassRegistration> {
            (registration.0)(&mut registry);
        }
        log::debug!("Collected {} registered classes", registry.len());
        registry
    }

    /// Adds a class, replacing any class registered under the same name.
    pub fn register<T: Any + Send + Sync>(&mut self, builder: ClassBuilder<T>) {
        let ClassBuilder {
            class_name, entry, ..
        } = builder;
        if self.classes.contains_key(&class_name) {
            log::warn!("Class '{class_name}' registered twice; keeping the last registration");
        }
        log::trace!("Registered class '{class_name}' as {}", entry.type_name);
        self.classes.insert(class_name, entry);
    }

    /// Returns `true` if `class_name` is registered.
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    /// The registered class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub(crate) fn entry(&self, class_name: &str) -> Option<&ClassEntry> {
        self.classes.get(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_type_inference() {
        assert_eq!(ArgType::of(&1.into()), ArgType::Integer);
        assert_eq!(ArgType::of(&5_000_000_000_i64.into()), ArgType::Long);
        assert_eq!(ArgType::of(&1.5.into()), ArgType::Double);
        assert_eq!(ArgType::of(&"x".into()), ArgType::String);
        assert_eq!(ArgType::of(&ConfigValue::Null), ArgType::Null);
        assert_eq!(
            Signature::of(&[true.into(), ConfigValue::List(vec![])]),
            Signature::new(&[ArgType::Boolean, ArgType::List])
        );
    }

    #[test]
    fn test_signature_display() {
        let signature = Signature::new(&[ArgType::String, ArgType::Integer]);
        assert_eq!(signature.to_string(), "(String, Integer)");
        assert_eq!(Signature::default().to_string(), "()");
    }

    #[test]
    fn test_constructor_lookup_is_exact() {
        let mut registry = ClassRegistry::new();
        registry.register(
            ClassBuilder::<i64>::new("num").constructor(&[ArgType::Integer], |args| {
                Ok(args[0].as_i64().unwrap_or_default())
            }),
        );
        let entry = registry.entry("num").unwrap();

        let product = entry.construct("num", &[7.into()]).unwrap();
        assert_eq!(product.downcast_ref::<i64>(), Some(&7));

        assert!(matches!(
            entry.construct("num", &[7.5.into()]),
            Err(InstantiationError::NoSuchConstructor { .. })
        ));
        assert!(matches!(
            entry.call_factory("num", "parse", &[]),
            Err(InstantiationError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn test_registry_listing() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassBuilder::<u8>::new("b").constructor(&[], |_| Ok(1)));
        registry.register(ClassBuilder::<u8>::new("a").constructor(&[], |_| Ok(2)));
        assert_eq!(registry.class_names(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.contains("c"));
    }
}
