//! Routing, extraction and statement rewrite errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while routing an operation to a shard.
///
/// Every variant aborts the current operation before a physical connection
/// is used. None of them are retried by the router.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum RouterError {
    /// Shard counts or default routing key are unusable
    #[error("Invalid shard config for {field}: {message}")]
    InvalidShardConfig {
        /// Name of the offending config field
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// Neither the operation nor the config names a routing key, or the
    /// resolved key value is blank
    #[error("Routing key is missing")]
    RoutingKeyMissing,

    /// The routing key value could not be located among the operation inputs
    #[error("Routing attribute not found: {attr}")]
    AttributeNotFound {
        /// Name of the attribute that was searched for
        attr: String,
    },

    /// Table rewrite is enabled but the statement names no table
    #[error("No table reference found in statement: {sql}")]
    AmbiguousTableReference {
        /// The statement that could not be rewritten
        sql: String,
    },

    /// Table rewrite was attempted while no table index is bound
    #[error("No table index bound to the current operation")]
    TableIndexUnbound,

    /// Routing was attempted outside of an operation scope
    #[error("No routing scope is active for the current operation")]
    NoRoutingScope,

    /// The current operation scope was already routed
    #[error("Operation is already routed to db {db_index:02}, table {tb_index:03}")]
    AlreadyRouted {
        /// Database index bound earlier in the scope
        db_index: u32,
        /// Table index bound earlier in the scope
        tb_index: u32,
    },

    /// The selector produced a data source identifier that is not configured
    #[error("Unknown data source: {id}")]
    UnknownDataSource {
        /// Identifier produced by the shard selector
        id: String,
    },
}

impl RouterError {
    /// Errors caused by static configuration rather than operation input.
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidShardConfig { .. } | Self::UnknownDataSource { .. })
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidShardConfig { field: field.to_string(), message: message.into() }
    }
}
