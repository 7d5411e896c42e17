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

//! Configuration-declared objects.
//!
//! A [`ClassDeclaration`] names a class registered in a [`ClassRegistry`]
//! together with its construction arguments. A [`Realizer`] builds it on
//! demand and shares the result according to the declaration's [`Scope`].

mod cache;
mod class;
mod error;
mod realize;
mod registry;

pub use cache::{Instance, SingletonCache};
pub use class::{ClassDeclaration, Scope};
pub use error::InstantiationError;
pub use realize::Realizer;
pub use registry::{ArgType, ClassBuilder, ClassRegistration, ClassRegistry, Signature};
