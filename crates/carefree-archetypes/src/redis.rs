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

//! Redis connection archetypes.
//!
//! A Redis root carries the connection itself plus three sections:
//!
//! ```text
//! main {
//!   host = "localhost"
//!   pool { max-total = 16 }
//!   resources { io-thread-pool-size = 4 }
//!   serializer { value-serializer = "codec.Json" }
//! }
//! ```

use carefree_core::{
    apply_reference, Archetype, BindingError, ClassDeclaration, CommonArchetype, ConfigTree,
    Lathe, LatheArchetype, LatheError, Payload, Realizer,
};
use std::collections::HashMap;

/// How the client reaches the server(s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedisMode {
    /// A single server.
    #[default]
    Standalone,
    /// A Redis Cluster.
    Cluster,
    /// Servers watched by Sentinels.
    Sentinel,
    /// A Unix domain socket.
    Socket,
    /// A fixed master and its replicas.
    StaticMasterReplica,
}

impl RedisMode {
    /// Parses a mode name case-insensitively; unknown names mean standalone.
    pub fn parse(name: &str) -> Self {
        [
            ("cluster", RedisMode::Cluster),
            ("sentinel", RedisMode::Sentinel),
            ("socket", RedisMode::Socket),
            ("staticmasterreplica", RedisMode::StaticMasterReplica),
        ]
        .into_iter()
        .find(|(candidate, _)| name.trim().eq_ignore_ascii_case(candidate))
        .map(|(_, mode)| mode)
        .unwrap_or_default()
    }
}

/// The connection of one Redis root. Durations are in milliseconds.
#[derive(Debug, Default, Clone, Archetype)]
pub struct RedisArchetype {
    /// See [`RedisMode`].
    pub mode: Option<String>,
    /// Replica read preference, e.g. `REPLICA_PREFERRED`.
    pub read_from: Option<String>,
    /// Name announced with `CLIENT SETNAME`.
    pub client_name: Option<String>,
    /// Database index.
    pub database: Option<i32>,
    /// Connection URL; overrides host, port and password.
    pub url: Option<String>,
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<i32>,
    /// Server password.
    pub password: Option<String>,
    /// Socket path, for [`RedisMode::Socket`].
    pub socket: Option<String>,
    /// Master name, for [`RedisMode::Sentinel`].
    pub master: Option<String>,
    /// `host:port` nodes, for cluster, sentinel and static replica modes.
    pub nodes: Option<Vec<String>>,
    /// Redirects followed in cluster mode.
    pub max_redirects: Option<i32>,
    /// Password of the Sentinels.
    pub sentinel_password: Option<String>,
    /// Use TLS.
    pub ssl: Option<bool>,
    /// Verify the peer certificate.
    pub verify_peer: Option<bool>,
    /// Issue STARTTLS.
    pub start_tls: Option<bool>,
    /// Command timeout.
    pub command_timeout: Option<i64>,
    /// Shutdown timeout.
    pub shutdown_timeout: Option<i64>,
    /// Quiet period before shutdown.
    pub shutdown_quiet_period: Option<i64>,
    /// `enabled`, `reference` and `configure-listener`.
    #[archetype(flatten)]
    pub common: CommonArchetype,
}

impl RedisArchetype {
    /// The configured connection mode.
    pub fn connect_mode(&self) -> RedisMode {
        self.mode.as_deref().map(RedisMode::parse).unwrap_or_default()
    }
}

impl LatheArchetype for RedisArchetype {
    fn common(&self) -> &CommonArchetype {
        &self.common
    }
}

/// The `pool` section of a Redis root.
#[derive(Debug, Default, Clone, Archetype)]
pub struct RedisPoolArchetype {
    /// Upper bound of connections.
    pub max_total: Option<i32>,
    /// Upper bound of idle connections.
    pub max_idle: Option<i32>,
    /// Lower bound of idle connections.
    pub min_idle: Option<i32>,
    /// Last-in first-out borrowing.
    pub lifo: Option<bool>,
    /// Serve waiting borrowers in order.
    pub fairness: Option<bool>,
    /// Block when the pool is exhausted.
    pub block_when_exhausted: Option<bool>,
    /// Longest wait for a connection.
    pub max_wait_millis: Option<i64>,
    /// Validate on create.
    pub test_on_create: Option<bool>,
    /// Validate on borrow.
    pub test_on_borrow: Option<bool>,
    /// Validate on return.
    pub test_on_return: Option<bool>,
    /// Validate idle connections.
    pub test_while_idle: Option<bool>,
    /// Interval of the eviction run.
    pub time_between_eviction_runs_millis: Option<i64>,
    /// Connections checked per eviction run.
    pub num_tests_per_eviction_run: Option<i32>,
    /// Idle time after which a connection may be evicted.
    pub min_evictable_idle_time_millis: Option<i64>,
    /// Idle time after which a connection above `min-idle` may be evicted.
    pub soft_min_evictable_idle_time_millis: Option<i64>,
    /// Grace period of the evictor on shutdown.
    pub evictor_shutdown_timeout_millis: Option<i64>,
    /// Eviction policy class.
    pub eviction_policy_class_name: Option<String>,
    /// Register the pool with JMX.
    pub jmx_enabled: Option<bool>,
    /// JMX name base.
    pub jmx_name_base: Option<String>,
    /// JMX name prefix.
    pub jmx_name_prefix: Option<String>,
}

/// A shared client resource that may be supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedisResource {
    /// Event loop group provider.
    EventLoopGroupProvider,
    /// Event executor group.
    EventExecutorGroup,
    /// Timer shared between clients.
    Timer,
    /// Event bus shared between clients.
    EventBus,
    /// Command latency publisher options.
    CommandLatencyPublisherOptions,
    /// Command latency collector options.
    CommandLatencyCollectorOptions,
    /// Command latency collector.
    CommandLatencyCollector,
    /// DNS resolver.
    DnsResolver,
    /// Reconnect delay.
    ReconnectDelay,
    /// Netty customizer.
    NettyCustomizer,
    /// Tracing of Redis calls.
    Tracing,
}

/// The `resources` section of a Redis root.
///
/// Every resource can be given either as a full class declaration or as a
/// bare `*-class-name`; see [`RedisResourcesArchetype::declaration`].
#[derive(Debug, Default, Clone, Archetype)]
pub struct RedisResourcesArchetype {
    /// Threads serving I/O. Must be positive.
    pub io_thread_pool_size: Option<i32>,
    /// Threads serving computations. Must be positive.
    pub computation_thread_pool_size: Option<i32>,
    /// Event loop group provider.
    pub event_loop_group_provider: Option<ClassDeclaration>,
    /// Event loop group provider, by class name only.
    pub event_loop_group_provider_class_name: Option<String>,
    /// Event executor group.
    pub event_executor_group: Option<ClassDeclaration>,
    /// Event executor group, by class name only.
    pub event_executor_group_class_name: Option<String>,
    /// Timer.
    pub timer: Option<ClassDeclaration>,
    /// Timer, by class name only.
    pub timer_class_name: Option<String>,
    /// Event bus.
    pub event_bus: Option<ClassDeclaration>,
    /// Event bus, by class name only.
    pub event_bus_class_name: Option<String>,
    /// Command latency publisher options.
    pub command_latency_publisher_options: Option<ClassDeclaration>,
    /// Command latency publisher options, by class name only.
    pub command_latency_publisher_options_class_name: Option<String>,
    /// Command latency collector options.
    pub command_latency_collector_options: Option<ClassDeclaration>,
    /// Command latency collector options, by class name only.
    pub command_latency_collector_options_class_name: Option<String>,
    /// Command latency collector.
    pub command_latency_collector: Option<ClassDeclaration>,
    /// Command latency collector, by class name only.
    pub command_latency_collector_class_name: Option<String>,
    /// DNS resolver.
    pub dns_resolver: Option<ClassDeclaration>,
    /// DNS resolver, by class name only.
    pub dns_resolver_class_name: Option<String>,
    /// Reconnect delay.
    pub reconnect_delay: Option<ClassDeclaration>,
    /// Reconnect delay, by class name only.
    pub reconnect_delay_class_name: Option<String>,
    /// Netty customizer.
    pub netty_customizer: Option<ClassDeclaration>,
    /// Netty customizer, by class name only.
    pub netty_customizer_class_name: Option<String>,
    /// Tracing.
    pub tracing: Option<ClassDeclaration>,
    /// Tracing, by class name only.
    pub tracing_class_name: Option<String>,
}

impl RedisResourcesArchetype {
    /// The declaration of `resource`.
    ///
    /// The full declaration wins; a bare class name stands for its default
    /// constructor.
    pub fn declaration(&self, resource: RedisResource) -> Option<ClassDeclaration> {
        let (declaration, class_name) = match resource {
            RedisResource::EventLoopGroupProvider => (
                &self.event_loop_group_provider,
                &self.event_loop_group_provider_class_name,
            ),
            RedisResource::EventExecutorGroup => {
                (&self.event_executor_group, &self.event_executor_group_class_name)
            }
            RedisResource::Timer => (&self.timer, &self.timer_class_name),
            RedisResource::EventBus => (&self.event_bus, &self.event_bus_class_name),
            RedisResource::CommandLatencyPublisherOptions => (
                &self.command_latency_publisher_options,
                &self.command_latency_publisher_options_class_name,
            ),
            RedisResource::CommandLatencyCollectorOptions => (
                &self.command_latency_collector_options,
                &self.command_latency_collector_options_class_name,
            ),
            RedisResource::CommandLatencyCollector => (
                &self.command_latency_collector,
                &self.command_latency_collector_class_name,
            ),
            RedisResource::DnsResolver => (&self.dns_resolver, &self.dns_resolver_class_name),
            RedisResource::ReconnectDelay => {
                (&self.reconnect_delay, &self.reconnect_delay_class_name)
            }
            RedisResource::NettyCustomizer => {
                (&self.netty_customizer, &self.netty_customizer_class_name)
            }
            RedisResource::Tracing => (&self.tracing, &self.tracing_class_name),
        };
        declaration.clone().or_else(|| {
            class_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .map(ClassDeclaration::new)
        })
    }
}

/// The `serializer` section of a Redis root. Serializers are class
/// declarations, or `DEFINED(<name>)` references to well-known codecs.
#[derive(Debug, Default, Clone, Archetype)]
pub struct RedisSerializerArchetype {
    /// Whether `default-serializer` applies to unset serializers.
    pub enable_default_serializer: Option<bool>,
    /// Fallback serializer.
    pub default_serializer: Option<ClassDeclaration>,
    /// Serializer of plain string templates.
    pub string_serializer: Option<ClassDeclaration>,
    /// Key serializer.
    pub key_serializer: Option<ClassDeclaration>,
    /// Value serializer.
    pub value_serializer: Option<ClassDeclaration>,
    /// Hash key serializer.
    pub hash_key_serializer: Option<ClassDeclaration>,
    /// Hash value serializer.
    pub hash_value_serializer: Option<ClassDeclaration>,
}

/// A loaded Redis root with its sections.
#[derive(Debug, Clone)]
pub struct RedisPayload {
    /// The root and its connection archetype.
    pub payload: Payload<RedisArchetype>,
    /// The `pool` section.
    pub pool: RedisPoolArchetype,
    /// The `resources` section.
    pub resources: RedisResourcesArchetype,
    /// The `serializer` section.
    pub serializer: RedisSerializerArchetype,
}

/// Loads every Redis root of a tree.
pub struct RedisLoader {
    lathe: Lathe<RedisArchetype>,
}

impl RedisLoader {
    /// Creates a loader realizing configure listeners with `realizer`.
    pub fn new(realizer: Realizer) -> Self {
        Self {
            lathe: Lathe::new(realizer),
        }
    }

    /// Loads every root of `tree`, binds its sections and resolves references.
    ///
    /// Disabled roots are loaded too; check [`Payload::enabled`].
    pub fn load(&self, key: &str, tree: &ConfigTree) -> Result<Vec<RedisPayload>, LatheError> {
        let mut payloads = self.lathe.load(key, tree)?;
        Lathe::inherit(&mut payloads)?;

        let mut loaded = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let pool = bind_section(&payload, tree, "pool")?;
            let resources = bind_section(&payload, tree, "resources")?;
            let serializer = bind_section(&payload, tree, "serializer")?;
            loaded.push(RedisPayload {
                payload,
                pool,
                resources,
                serializer,
            });
        }
        inherit_pools(&mut loaded)?;
        Ok(loaded)
    }
}

fn bind_section<S: Archetype>(
    payload: &Payload<RedisArchetype>,
    tree: &ConfigTree,
    name: &str,
) -> Result<S, LatheError> {
    payload
        .section(tree, name)
        .map_err(|source| section_error(payload, source))
}

// Pools borrow from the pool of the directly referenced root only.
fn inherit_pools(loaded: &mut [RedisPayload]) -> Result<(), LatheError> {
    let pools: HashMap<String, RedisPoolArchetype> = loaded
        .iter()
        .map(|redis| (redis.payload.root().to_owned(), redis.pool.clone()))
        .collect();
    for redis in loaded.iter_mut() {
        let Some(reference) = redis.payload.archetype().common.reference.as_deref() else {
            continue;
        };
        if let Some(reference_pool) = pools.get(reference) {
            apply_reference(&mut redis.pool, reference_pool)
                .map_err(|source| section_error(&redis.payload, source))?;
        }
    }
    Ok(())
}

fn section_error(payload: &Payload<RedisArchetype>, source: BindingError) -> LatheError {
    LatheError::Binding {
        root: payload.root().to_owned(),
        source,
    }
}
