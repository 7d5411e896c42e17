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

//! Loading every entity described by a configuration tree.
//!
//! A tree such as
//!
//! ```text
//! main  { host = "a", port = 6379 }
//! cache { reference = "main", database = 2 }
//! ```
//!
//! describes two entities, one per root. The [`Lathe`] binds one archetype
//! per root, using the root named by `reference` as the default prefix, and
//! hands each result to the archetype's configure listener.

use crate::archetype::Archetype;
use crate::binding::{apply_reference, from_config, BindingError};
use crate::config::{ConfigError, ConfigTree};
use crate::declaration::{ClassDeclaration, InstantiationError, Realizer};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Properties shared by every lathe-loaded archetype.
///
/// Embed it with `#[archetype(flatten)]`.
#[derive(Debug, Clone, crate::Archetype)]
pub struct CommonArchetype {
    /// Declares a [`ConfigureListener`] notified once the archetype is bound.
    pub configure_listener: Option<ClassDeclaration>,
    /// Whether the entity is in use. Defaults to `true`.
    pub enabled: Option<bool>,
    /// The root this entity borrows unset properties from.
    pub reference: Option<String>,
}

impl Default for CommonArchetype {
    fn default() -> Self {
        Self {
            configure_listener: None,
            enabled: Some(true),
            reference: None,
        }
    }
}

/// An archetype loadable by a [`Lathe`].
pub trait LatheArchetype: Archetype {
    /// The embedded common properties.
    fn common(&self) -> &CommonArchetype;
}

/// Observes archetypes as a [`Lathe`] loads them.
///
/// Register implementations as classes producing a
/// `Box<dyn ConfigureListener<A>>` and name them in `configure-listener`.
pub trait ConfigureListener<A>: Send + Sync {
    /// Called once the archetype of `payload` is bound.
    fn archetype(&self, _payload: &Payload<A>) {}
}

/// An error raised while loading a tree through a [`Lathe`].
#[derive(Debug, thiserror::Error)]
pub enum LatheError {
    /// The `reference` entry of a root is not a string.
    #[error("cannot read the reference of root '{root}'")]
    Reference {
        /// The root being loaded.
        root: String,
        /// The read failure.
        #[source]
        source: ConfigError,
    },
    /// Binding a root failed.
    #[error("cannot bind root '{root}'")]
    Binding {
        /// The root being loaded.
        root: String,
        /// The binding failure.
        #[source]
        source: BindingError,
    },
    /// The configure listener of a root could not be realized.
    #[error("cannot realize the configure listener of root '{root}'")]
    Listener {
        /// The root being loaded.
        root: String,
        /// The realization failure.
        #[source]
        source: InstantiationError,
    },
    /// Roots reference each other in a loop.
    #[error("reference cycle: {}", chain.join(" -> "))]
    ReferenceCycle {
        /// The roots visited, ending with the repeated one.
        chain: Vec<String>,
    },
}

/// One loaded entity.
#[derive(Debug, Clone)]
pub struct Payload<A> {
    key: String,
    root: String,
    reference_root: Option<String>,
    archetype: A,
}

impl<A: LatheArchetype> Payload<A> {
    /// The key of the tree the entity was loaded from.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The root naming the entity.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The root used as default prefix, if any.
    pub fn reference_root(&self) -> Option<&str> {
        self.reference_root.as_deref()
    }

    /// The bound archetype.
    pub fn archetype(&self) -> &A {
        &self.archetype
    }

    /// Consumes the payload, returning the archetype.
    pub fn into_archetype(self) -> A {
        self.archetype
    }

    /// Returns `false` only if `enabled` is explicitly `false`.
    pub fn enabled(&self) -> bool {
        self.archetype.common().enabled != Some(false)
    }

    /// Binds the section `name` of this entity, e.g. `main.pool`, falling
    /// back on the same section of the reference root.
    pub fn section<S: Archetype>(&self, tree: &ConfigTree, name: &str) -> Result<S, BindingError> {
        let prefix = format!("{}.{name}", self.root);
        let default_prefix = self
            .reference_root
            .as_ref()
            .map(|reference| format!("{reference}.{name}"));
        from_config(tree, Some(&prefix), default_prefix.as_deref())
    }
}

/// Loads a [`Payload`] for every root of a tree.
pub struct Lathe<A> {
    realizer: Realizer,
    _archetype: PhantomData<fn() -> A>,
}

impl<A: LatheArchetype> Lathe<A> {
    /// Creates a lathe realizing configure listeners with `realizer`.
    pub fn new(realizer: Realizer) -> Self {
        Self {
            realizer,
            _archetype: PhantomData,
        }
    }

    /// The realizer used for configure listeners.
    pub fn realizer(&self) -> &Realizer {
        &self.realizer
    }

    /// Binds one archetype per root of `tree`, in root order, and notifies
    /// each archetype's configure listener.
    pub fn load(&self, key: &str, tree: &ConfigTree) -> Result<Vec<Payload<A>>, LatheError> {
        let mut payloads = Vec::new();
        for root in tree.roots() {
            let reference_path = format!("{root}.reference");
            let reference_root = if tree.has_path(&reference_path) {
                let reference = tree
                    .get_string(&reference_path)
                    .map_err(|source| LatheError::Reference {
                        root: root.clone(),
                        source,
                    })?;
                Some(reference).filter(|reference| !reference.trim().is_empty())
            } else {
                None
            };

            let archetype = from_config::<A>(tree, Some(&root), reference_root.as_deref())
                .map_err(|source| LatheError::Binding {
                    root: root.clone(),
                    source,
                })?;
            log::debug!("Loaded root '{root}' of '{key}'");

            let payload = Payload {
                key: key.to_owned(),
                root,
                reference_root,
                archetype,
            };
            self.notify(&payload)?;
            payloads.push(payload);
        }
        Ok(payloads)
    }

    fn notify(&self, payload: &Payload<A>) -> Result<(), LatheError> {
        let Some(declaration) = payload.archetype.common().configure_listener.as_ref() else {
            return Ok(());
        };
        let listener = self
            .realizer
            .realize::<Box<dyn ConfigureListener<A>>>(declaration)
            .map_err(|source| LatheError::Listener {
                root: payload.root.clone(),
                source,
            })?;
        if let Some(listener) = listener {
            listener.archetype(payload);
        }
        Ok(())
    }

    /// Fills unset properties of every payload along its `reference` chain,
    /// nearest ancestor first.
    ///
    /// A reference to an unknown root ends the chain with a warning. A chain
    /// that loops fails with [`LatheError::ReferenceCycle`].
    pub fn inherit(payloads: &mut [Payload<A>]) -> Result<(), LatheError> {
        let index: HashMap<String, usize> = payloads
            .iter()
            .enumerate()
            .map(|(position, payload)| (payload.root.clone(), position))
            .collect();
        let originals: Vec<A> = payloads.iter().map(|payload| payload.archetype.clone()).collect();

        for payload in payloads.iter_mut() {
            let mut chain = vec![payload.root.clone()];
            let mut next = declared_reference(&payload.archetype);
            while let Some(reference) = next {
                if chain.contains(&reference) {
                    chain.push(reference);
                    return Err(LatheError::ReferenceCycle { chain });
                }
                let Some(&position) = index.get(&reference) else {
                    log::warn!("No reference '{reference}' for root '{}'", payload.root);
                    break;
                };
                let ancestor = &originals[position];
                apply_reference(&mut payload.archetype, ancestor).map_err(|source| {
                    LatheError::Binding {
                        root: payload.root.clone(),
                        source,
                    }
                })?;
                chain.push(reference);
                next = declared_reference(ancestor);
            }
        }
        Ok(())
    }
}

fn declared_reference<A: LatheArchetype>(archetype: &A) -> Option<String> {
    archetype
        .common()
        .reference
        .clone()
        .filter(|reference| !reference.trim().is_empty())
}
