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

//! # Carefree Core
//!
//! Binds hierarchical configuration trees onto strongly-typed "archetype"
//! structs and realizes configuration-declared objects through a registry of
//! named factories.
//!
//! The pipeline is:
//!
//! 1. a [`ConfigTree`] is supplied by the host,
//! 2. [`binding::bind`] populates an [`Archetype`] from it, probing each
//!    property under its verbatim, kebab-case and snake_case names,
//! 3. [`binding::apply_reference`] optionally fills unset properties from a
//!    peer archetype,
//! 4. [`ClassDeclaration`] properties are realized on demand by a
//!    [`Realizer`], which honours the declaration's [`Scope`].

#![warn(missing_docs)]

// Lets `#[derive(Archetype)]` expand to `::carefree_core::...` inside this crate too.
extern crate self as carefree_core;

pub mod archetype;
pub mod binding;
pub mod config;
pub mod declaration;
pub mod lathe;
pub mod naming;

pub use archetype::{Archetype, PropertyDescriptor, PropertyKind, PropertyType, PropertyValue};
pub use binding::{apply_reference, bind, from_config, BindingError};
pub use carefree_macros::Archetype;
pub use config::{ConfigError, ConfigRegistry, ConfigTree, ConfigValue, Number};
pub use declaration::{
    ArgType, ClassBuilder, ClassDeclaration, ClassRegistration, ClassRegistry,
    InstantiationError, Realizer, Scope, Signature, SingletonCache,
};
pub use lathe::{CommonArchetype, ConfigureListener, Lathe, LatheArchetype, LatheError, Payload};
