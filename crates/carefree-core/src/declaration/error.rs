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

//! Defines the error raised when realizing a class declaration fails.

use super::Signature;

/// An error raised by [`Realizer::realize`](super::Realizer::realize).
#[derive(Debug, thiserror::Error)]
pub enum InstantiationError {
    /// No class is registered under the declared name.
    #[error("class '{class_name}' is not registered")]
    ClassNotFound {
        /// The declared class name.
        class_name: String,
    },
    /// The class has no constructor for the runtime types of the arguments.
    #[error("class '{class_name}' has no constructor {signature}")]
    NoSuchConstructor {
        /// The declared class name.
        class_name: String,
        /// The signature inferred from the arguments.
        signature: Signature,
    },
    /// The class has no static factory or initializer with that name and signature.
    #[error("class '{class_name}' has no method {method}{signature}")]
    NoSuchMethod {
        /// The declared class name.
        class_name: String,
        /// The method name.
        method: String,
        /// The signature inferred from the arguments.
        signature: Signature,
    },
    /// A registered constructor, factory or initializer failed.
    #[error("invoking {member} of class '{class_name}' failed")]
    Invocation {
        /// The declared class name.
        class_name: String,
        /// A description of what was invoked.
        member: String,
        /// The failure reported by the callee.
        #[source]
        source: anyhow::Error,
    },
    /// Building a cached instance asked for that same instance again.
    #[error("class '{class_name}' was realized again while being constructed")]
    RecursiveConstruction {
        /// The declared class name.
        class_name: String,
    },
    /// The realized object is not of the type the caller asked for.
    #[error("class '{class_name}' does not produce a {expected}")]
    TypeMismatch {
        /// The declared class name.
        class_name: String,
        /// The requested type.
        expected: &'static str,
    },
}
