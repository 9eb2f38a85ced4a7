//! Chooses the physical data source for the running operation.

use shard_router_types::models::{format_db_key, DEFAULT_DATA_SOURCE_PREFIX};
use shard_router_types::RouterConfig;

use super::context::{self, RoutingContext};

/// Maps the routing context to a physical data source identifier.
///
/// Unrouted operations go to the default data source; routed ones go to
/// `prefix + %02d(db_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    default_data_source: String,
    prefix: String,
}

impl ShardSelector {
    pub fn new(default_data_source: impl Into<String>) -> Self {
        Self::with_prefix(default_data_source, DEFAULT_DATA_SOURCE_PREFIX)
    }

    pub fn with_prefix(default_data_source: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self { default_data_source: default_data_source.into(), prefix: prefix.into() }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::with_prefix(config.default_data_source.clone(), config.data_source_prefix.clone())
    }

    pub fn default_data_source(&self) -> &str {
        &self.default_data_source
    }

    /// Data source for the running operation.
    pub fn resolve_connection(&self) -> String {
        self.resolve_for(&context::current())
    }

    /// Data source for an explicit context.
    pub fn resolve_for(&self, ctx: &RoutingContext) -> String {
        match ctx.db_index() {
            Some(db_index) => format!("{}{}", self.prefix, format_db_key(db_index)),
            None => self.default_data_source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_router_types::RoutingDecision;

    #[test]
    fn test_unrouted_resolves_to_default() {
        let selector = ShardSelector::new("db00");
        assert_eq!(selector.resolve_connection(), "db00");
        context::sync_scope(|| assert_eq!(selector.resolve_connection(), "db00"));
    }

    #[test]
    fn test_routed_resolves_to_prefixed_index() {
        let selector = ShardSelector::new("db00");
        context::sync_scope(|| {
            context::bind(RoutingDecision::new(2, 1)).unwrap();
            for _ in 0..3 {
                assert_eq!(selector.resolve_connection(), "db02");
            }
            context::clear();
            assert_eq!(selector.resolve_connection(), "db00");
        });
    }

    #[test]
    fn test_custom_prefix() {
        let selector = ShardSelector::with_prefix("main", "shard_");
        assert_eq!(selector.default_data_source(), "main");
        assert_eq!(selector.resolve_for(&RoutingContext::empty()), "main");
        context::sync_scope(|| {
            context::bind(RoutingDecision::new(11, 0)).unwrap();
            assert_eq!(selector.resolve_connection(), "shard_11");
        });
    }
}
