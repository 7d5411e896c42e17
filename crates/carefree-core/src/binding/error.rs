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

//! Defines the error raised when binding an archetype fails.

use crate::archetype::PropertyError;
use crate::config::ConfigError;

/// An error that aborts a whole [`bind`](super::bind) call.
///
/// Every variant names the archetype and property concerned. The underlying
/// cause is available through [`std::error::Error::source`].
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The configured value could not be read as the property's type.
    #[error("cannot bind property '{property}' of {archetype} from '{path}'")]
    Coercion {
        /// The archetype being bound.
        archetype: &'static str,
        /// The logical property name.
        property: String,
        /// The configuration path that matched.
        path: String,
        /// The conversion failure.
        #[source]
        source: ConfigError,
    },
    /// The coerced value was refused by the property's mutator.
    #[error("cannot set property '{property}' of {archetype} from '{path}'")]
    Property {
        /// The archetype being bound.
        archetype: &'static str,
        /// The logical property name.
        property: String,
        /// The configuration path that matched.
        path: String,
        /// The mutator failure.
        #[source]
        source: PropertyError,
    },
    /// A class declaration property holds neither a string nor an object.
    #[error(
        "property '{property}' of {archetype} at '{path}' must be a class name or an object, found {found}"
    )]
    Declaration {
        /// The archetype being bound.
        archetype: &'static str,
        /// The logical property name.
        property: String,
        /// The configuration path that matched.
        path: String,
        /// The type actually configured.
        found: &'static str,
    },
    /// Binding a class declaration described as an object failed.
    #[error("cannot bind the class declaration '{property}' of {archetype} at '{path}'")]
    Nested {
        /// The archetype being bound.
        archetype: &'static str,
        /// The logical property name.
        property: String,
        /// The configuration path that matched.
        path: String,
        /// The failure inside the declaration.
        #[source]
        source: Box<BindingError>,
    },
    /// A value copied from a reference archetype was refused.
    #[error("cannot copy property '{property}' of {archetype} from its reference")]
    Reference {
        /// The archetype being filled.
        archetype: &'static str,
        /// The logical property name.
        property: String,
        /// The mutator failure.
        #[source]
        source: PropertyError,
    },
}
