//! Full router configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::data_source::DataSourceProps;
use crate::error::{ConfigError, TypedError};
use crate::models::decision::format_db_key;
use crate::models::shard::ShardConfig;

/// Prefix joined with the 2-digit database index to name a physical
/// data source (`db01`, `db02`, ...).
pub const DEFAULT_DATA_SOURCE_PREFIX: &str = "db";

/// Everything the router needs at startup: the shard layout plus the
/// physical data sources it selects between.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterConfig {
    /// Shard layout (`db_count`, `tb_count`, `router_key`), flattened
    #[serde(flatten)]
    pub shard: ShardConfig,
    /// Data source used when an operation was not routed
    pub default_data_source: String,
    /// Prefix of routed data source identifiers
    #[serde(default = "default_data_source_prefix")]
    pub data_source_prefix: String,
    /// Properties inherited by every data source
    #[serde(default)]
    pub global: DataSourceProps,
    /// Data sources by identifier
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSourceProps>,
}

impl RouterConfig {
    pub fn new(shard: ShardConfig, default_data_source: impl Into<String>) -> Self {
        Self {
            shard,
            default_data_source: default_data_source.into(),
            data_source_prefix: default_data_source_prefix(),
            global: DataSourceProps::default(),
            data_sources: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_data_source(mut self, id: impl Into<String>, props: DataSourceProps) -> Self {
        let _previous = self.data_sources.insert(id.into(), props);
        self
    }

    #[must_use]
    pub fn with_global(mut self, global: DataSourceProps) -> Self {
        self.global = global;
        self
    }

    /// Identifiers of the routed data sources, `prefix + %02d` for
    /// `1..=db_count`.
    pub fn shard_data_source_ids(&self) -> Vec<String> {
        (1..=self.shard.db_count)
            .map(|db_index| format!("{}{}", self.data_source_prefix, format_db_key(db_index)))
            .collect()
    }

    /// Properties of `id` with the global block merged in.
    pub fn resolved_data_source(&self, id: &str) -> Option<DataSourceProps> {
        self.data_sources.get(id).map(|props| props.merged_with(&self.global))
    }

    /// Validate the shard layout and that every data source the selector
    /// can produce is configured.
    pub fn validate(&self) -> Result<(), TypedError> {
        self.shard.check()?;

        if self.default_data_source.trim().is_empty() {
            return Err(ConfigError::invalid("default_data_source", "must not be blank").into());
        }
        if !self.data_sources.contains_key(&self.default_data_source) {
            return Err(ConfigError::invalid(
                "default_data_source",
                format!("data source '{}' is not configured", self.default_data_source),
            )
            .into());
        }

        if let Some(missing) =
            self.shard_data_source_ids().into_iter().find(|id| !self.data_sources.contains_key(id))
        {
            return Err(ConfigError::invalid(
                "data_sources",
                format!("routed data source '{missing}' is not configured"),
            )
            .into());
        }

        Ok(())
    }
}

fn default_data_source_prefix() -> String {
    DEFAULT_DATA_SOURCE_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RouterError;

    fn sample() -> RouterConfig {
        RouterConfig::new(ShardConfig::new(2, 4, "uId").expect("valid"), "db00")
            .with_data_source("db00", DataSourceProps::with_url("postgres://h/db00"))
            .with_data_source("db01", DataSourceProps::with_url("postgres://h/db01"))
            .with_data_source("db02", DataSourceProps::with_url("postgres://h/db02"))
    }

    #[test]
    fn test_valid_config() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.shard_data_source_ids(), vec!["db01", "db02"]);
    }

    #[test]
    fn test_missing_shard_data_source() {
        let mut config = sample();
        let _removed = config.data_sources.remove("db02");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("db02"));
    }

    #[test]
    fn test_missing_default_data_source() {
        let mut config = sample();
        config.default_data_source = "db99".to_string();
        assert!(matches!(
            config.validate(),
            Err(TypedError::Config(ConfigError::ValidationError { ref field, .. }))
                if field == "default_data_source"
        ));
    }

    #[test]
    fn test_invalid_shard_layout_surfaces_router_error() {
        let mut config = sample();
        config.shard.tb_count = 0;
        assert!(matches!(
            config.validate(),
            Err(TypedError::Router(RouterError::InvalidShardConfig { .. }))
        ));
    }

    #[test]
    fn test_parse_flattened_shard_fields() {
        let json = r#"{
            "db_count": 2,
            "tb_count": 4,
            "router_key": "uId",
            "default_data_source": "db00",
            "global": { "username": "root", "pool": { "max_connections": 10 } },
            "data_sources": {
                "db00": { "url": "postgres://h/db00" },
                "db01": { "url": "postgres://h/db01" },
                "db02": { "url": "postgres://h/db02", "username": "shard" }
            }
        }"#;

        let config: RouterConfig = serde_json::from_str(json).expect("parses");
        assert_eq!(config.shard.tb_count, 4);
        assert_eq!(config.data_source_prefix, "db");
        assert!(config.validate().is_ok());

        let db01 = config.resolved_data_source("db01").expect("configured");
        assert_eq!(db01.username.as_deref(), Some("root"));
        let db02 = config.resolved_data_source("db02").expect("configured");
        assert_eq!(db02.username.as_deref(), Some("shard"));
        assert_eq!(db02.pool.and_then(|pool| pool.max_connections), Some(10));
    }
}
