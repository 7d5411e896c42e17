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

//! # Carefree Archetypes
//!
//! Configuration shapes for connection pools, Redis and RabbitMQ clients, loaded with
//! the [`carefree_core::Lathe`]. Building the clients themselves is left to
//! the host.

#![warn(missing_docs)]

pub mod datasource;
pub mod rabbit;
pub mod redis;

pub use datasource::DataSourceArchetype;
pub use rabbit::RabbitArchetype;
pub use redis::{
    RedisArchetype, RedisLoader, RedisMode, RedisPayload, RedisPoolArchetype, RedisResource,
    RedisResourcesArchetype, RedisSerializerArchetype,
};
