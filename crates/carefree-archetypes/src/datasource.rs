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

//! The JDBC-style connection pool archetype.

use carefree_core::{Archetype, CommonArchetype, LatheArchetype};

/// One pooled data source.
///
/// Timeouts are in milliseconds.
#[derive(Debug, Default, Clone, Archetype)]
pub struct DataSourceArchetype {
    /// Pool name, used in monitoring.
    pub name: Option<String>,
    /// Connection URL.
    pub url: Option<String>,
    /// Login user.
    pub username: Option<String>,
    /// Login password.
    pub password: Option<String>,
    /// Driver class; inferred from the URL when unset.
    pub driver_class_name: Option<String>,
    /// Connections opened at startup.
    pub initial_size: Option<i32>,
    /// Upper bound of open connections.
    pub max_active: Option<i32>,
    /// Lower bound of idle connections.
    pub min_idle: Option<i32>,
    /// Longest wait for a connection.
    pub max_wait: Option<i64>,
    /// Whether prepared statements are cached.
    pub pool_prepared_statements: Option<bool>,
    /// Prepared statement cache size per connection.
    pub max_pool_prepared_statement_per_connection_size: Option<i32>,
    /// Statement used to check a connection.
    pub validation_query: Option<String>,
    /// Timeout of the validation query, in seconds.
    pub validation_query_timeout: Option<i32>,
    /// Validate on borrow.
    pub test_on_borrow: Option<bool>,
    /// Validate on return.
    pub test_on_return: Option<bool>,
    /// Validate idle connections.
    pub test_while_idle: Option<bool>,
    /// Keep idle connections alive.
    pub keep_alive: Option<bool>,
    /// Interval of the eviction run.
    pub time_between_eviction_runs_millis: Option<i64>,
    /// Idle time after which a connection may be evicted.
    pub min_evictable_idle_time_millis: Option<i64>,
    /// Statements run on every new connection.
    pub connection_init_sqls: Option<Vec<String>>,
    /// Exception sorter class.
    pub exception_sorter: Option<String>,
    /// Comma-separated filter aliases, e.g. `stat,wall`.
    pub filters: Option<String>,
    /// Filter class names.
    pub proxy_filters: Option<Vec<String>>,
    /// `enabled`, `reference` and `configure-listener`.
    #[archetype(flatten)]
    pub common: CommonArchetype,
}

impl LatheArchetype for DataSourceArchetype {
    fn common(&self) -> &CommonArchetype {
        &self.common
    }
}

impl DataSourceArchetype {
    /// The filter aliases listed in `filters`, trimmed, empties dropped.
    pub fn filter_aliases(&self) -> Vec<&str> {
        self.filters
            .as_deref()
            .map(|filters| {
                filters
                    .split(',')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
