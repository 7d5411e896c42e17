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

//! The configuration tree consumed by the binder.
//!
//! Locating and merging configuration sources is the host's job; this module
//! only models the resulting read-only tree and a holder for named trees.

mod registry;
mod tree;
mod value;

pub use registry::ConfigRegistry;
pub use tree::ConfigTree;
pub use value::{ConfigValue, Number};

/// An error raised while reading a value out of a [`ConfigTree`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Nothing (or an explicit null) is stored at the path.
    #[error("no configuration setting found for key '{path}'")]
    Missing {
        /// The path that was looked up.
        path: String,
    },
    /// The value exists but cannot be read as the requested type.
    #[error("'{path}' has type {found} rather than {expected}")]
    WrongType {
        /// The path that was looked up.
        path: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The type actually stored.
        found: &'static str,
    },
    /// A string value could not be parsed as the requested type.
    #[error("'{path}' could not be parsed as {expected}: {value:?}")]
    BadValue {
        /// The path that was looked up.
        path: String,
        /// The type the caller asked for.
        expected: &'static str,
        /// The offending text.
        value: String,
    },
    /// A number does not fit in the requested width.
    #[error("'{path}' has out-of-range value {value} for a {expected}")]
    OutOfRange {
        /// The path that was looked up.
        path: String,
        /// The requested numeric type.
        expected: &'static str,
        /// The offending number.
        value: String,
    },
    /// The configuration document itself is malformed.
    #[error("malformed configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn wrong_type(path: &str, expected: &'static str, found: &ConfigValue) -> Self {
        ConfigError::WrongType {
            path: path.to_owned(),
            expected,
            found: found.type_name(),
        }
    }
}
