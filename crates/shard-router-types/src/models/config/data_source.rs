//! Physical data source connection properties.

use serde::{Deserialize, Serialize};

/// Connection properties for one physical database.
///
/// Every field is optional so a data source can leave values to the
/// `global` block of the router config; see [`DataSourceProps::inherit`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DataSourceProps {
    /// Connection URL (`postgres://host:port/db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Login user, overrides any user embedded in the URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Login password, overrides any password embedded in the URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Pool tuning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolProps>,
}

impl DataSourceProps {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: Some(url.into()), ..Self::default() }
    }

    /// Fill every unset field from `global`. Values set locally always win;
    /// the nested pool block is merged field by field.
    pub fn inherit(&mut self, global: &Self) {
        fill(&mut self.url, &global.url);
        fill(&mut self.username, &global.username);
        fill(&mut self.password, &global.password);
        match (&mut self.pool, &global.pool) {
            (Some(pool), Some(global_pool)) => pool.inherit(global_pool),
            (None, Some(global_pool)) => self.pool = Some(global_pool.clone()),
            _ => {},
        }
    }

    /// Copy of `self` with `global` merged in.
    pub fn merged_with(&self, global: &Self) -> Self {
        let mut merged = self.clone();
        merged.inherit(global);
        merged
    }
}

/// Connection pool tuning for one data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PoolProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lifetime_secs: Option<u64>,
}

impl PoolProps {
    pub fn inherit(&mut self, global: &Self) {
        fill(&mut self.max_connections, &global.max_connections);
        fill(&mut self.min_connections, &global.min_connections);
        fill(&mut self.acquire_timeout_secs, &global.acquire_timeout_secs);
        fill(&mut self.idle_timeout_secs, &global.idle_timeout_secs);
        fill(&mut self.max_lifetime_secs, &global.max_lifetime_secs);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, fallback: &Option<T>) {
    if slot.is_none() {
        slot.clone_from(fallback);
    }
}
