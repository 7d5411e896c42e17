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

//! The RabbitMQ connection archetype.

use carefree_core::naming;
use carefree_core::{Archetype, ClassDeclaration, CommonArchetype, ConfigValue, LatheArchetype};
use std::collections::{BTreeMap, HashMap};

/// One RabbitMQ connection factory. Timeouts are in milliseconds.
#[derive(Debug, Default, Clone, Archetype)]
pub struct RabbitArchetype {
    /// Virtual host.
    pub virtual_host: Option<String>,
    /// Broker host.
    pub host: Option<String>,
    /// Broker port.
    pub port: Option<i32>,
    /// Login user; ignored when `credentials-provider` is set.
    pub username: Option<String>,
    /// Login password; ignored when `credentials-provider` is set.
    pub password: Option<String>,
    /// Supplies user name and password.
    pub credentials_provider: Option<ClassDeclaration>,
    /// AMQP URI; overrides host, port, virtual host and credentials.
    pub uri: Option<String>,
    /// Highest channel number the client asks for.
    pub requested_channel_max: Option<i32>,
    /// Largest frame the client asks for, in bytes.
    pub requested_frame_max: Option<i32>,
    /// Heartbeat interval the client asks for, in seconds.
    pub requested_heartbeat: Option<i32>,
    /// TCP connect timeout.
    pub connection_timeout: Option<i32>,
    /// AMQP handshake timeout.
    pub handshake_timeout: Option<i32>,
    /// Timeout of connection shutdown.
    pub shutdown_timeout: Option<i32>,
    /// Properties announced to the broker.
    ///
    /// Like every map property this receives every entry of the bound tree;
    /// use [`RabbitArchetype::client_properties_of`] for the announced ones.
    pub client_properties: Option<HashMap<String, ConfigValue>>,
    /// Creates the sockets.
    pub socket_factory: Option<ClassDeclaration>,
    /// SASL mechanism configuration.
    pub sasl_config: Option<ClassDeclaration>,
    /// Reconnect after a network failure.
    pub automatic_recovery: Option<bool>,
    /// Redeclare exchanges, queues and bindings after recovery.
    pub topology_recovery: Option<bool>,
    /// Pause between recovery attempts.
    pub network_recovery_interval: Option<i64>,
    /// Use the NIO transport.
    pub nio: Option<bool>,
    /// Creates the frame handlers.
    pub frame_handler_factory: Option<ClassDeclaration>,
    /// Timeout of channel RPC calls.
    pub channel_rpc_timeout: Option<i32>,
    /// Check the response type of channel RPC calls.
    pub channel_should_check_rpc_response_type: Option<bool>,
    /// How long closing waits for pending consumer work.
    pub work_pool_timeout: Option<i32>,
    /// `enabled`, `reference` and `configure-listener`.
    #[archetype(flatten)]
    pub common: CommonArchetype,
}

impl LatheArchetype for RabbitArchetype {
    fn common(&self) -> &CommonArchetype {
        &self.common
    }
}

impl RabbitArchetype {
    /// The client properties declared under `root`, keyed relative to the
    /// `client-properties` block.
    ///
    /// The block may be spelled in any of the three naming conventions.
    pub fn client_properties_of(&self, root: &str) -> BTreeMap<String, ConfigValue> {
        let Some(entries) = &self.client_properties else {
            return BTreeMap::new();
        };
        let name = "clientProperties";
        let prefixes = [
            format!("{root}.{name}."),
            format!("{root}.{}.", naming::to_kebab(name)),
            format!("{root}.{}.", naming::to_snake(name)),
        ];
        entries
            .iter()
            .filter_map(|(path, value)| {
                prefixes
                    .iter()
                    .find_map(|prefix| path.strip_prefix(prefix.as_str()))
                    .map(|key| (key.to_owned(), value.clone()))
            })
            .collect()
    }

    /// The class declarations that are set, by property name.
    pub fn declarations(&self) -> Vec<(&'static str, &ClassDeclaration)> {
        [
            ("credentialsProvider", &self.credentials_provider),
            ("socketFactory", &self.socket_factory),
            ("saslConfig", &self.sasl_config),
            ("frameHandlerFactory", &self.frame_handler_factory),
        ]
        .into_iter()
        .filter_map(|(name, declaration)| declaration.as_ref().map(|declaration| (name, declaration)))
        .collect()
    }
}
