//! Physical data sources behind the shard selector.
//!
//! One lazily connected `sqlx` pool per configured data source. Pools are
//! created on first use and shared by every operation routed to them.

use dashmap::DashMap;
use shard_router_types::{ConfigError, DataSourceProps, RouterConfig, RouterError};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tokio::runtime::Handle;

use crate::error::{AppError, AppResult};
use crate::router::ShardSelector;

/// Registry of the physical data sources a router selects between.
pub struct DataSourceRegistry {
    selector: ShardSelector,
    data_sources: BTreeMap<String, DataSourceProps>,
    pools: DashMap<String, PgPool>,
}

impl DataSourceRegistry {
    /// Validate `config`, merge the global block into every data source and
    /// check that each one can be connected to. No connection is opened.
    pub fn from_config(config: &RouterConfig) -> AppResult<Self> {
        config.validate()?;

        let mut data_sources = BTreeMap::new();
        for id in config.data_sources.keys() {
            let props = config
                .resolved_data_source(id)
                .ok_or_else(|| RouterError::UnknownDataSource { id: id.clone() })?;
            let _options = connect_options(id, &props)?;
            let _previous = data_sources.insert(id.clone(), props);
        }

        Ok(Self { selector: ShardSelector::from_config(config), data_sources, pools: DashMap::new() })
    }

    pub const fn selector(&self) -> &ShardSelector {
        &self.selector
    }

    /// Configured identifiers, sorted.
    pub fn data_source_ids(&self) -> Vec<&str> {
        self.data_sources.keys().map(String::as_str).collect()
    }

    /// Merged properties of data source `id`.
    pub fn props(&self, id: &str) -> Option<&DataSourceProps> {
        self.data_sources.get(id)
    }

    /// Identifier the running operation is routed to.
    pub fn current_data_source_id(&self) -> String {
        self.selector.resolve_connection()
    }

    /// Pool of data source `id`, created on first use.
    ///
    /// Creating a pool needs a running Tokio runtime; outside one this fails
    /// with [`AppError::Runtime`] unless the pool already exists.
    pub fn pool(&self, id: &str) -> AppResult<PgPool> {
        if let Some(pool) = self.pools.get(id) {
            return Ok(pool.clone());
        }

        let props = self
            .data_sources
            .get(id)
            .ok_or_else(|| RouterError::UnknownDataSource { id: id.to_string() })?;
        let pool = self.pools.entry(id.to_string()).or_try_insert_with(|| build_pool(id, props))?;
        Ok(pool.clone())
    }

    /// Pool of the data source the running operation is routed to.
    pub fn current_pool(&self) -> AppResult<PgPool> {
        self.pool(&self.current_data_source_id())
    }

    /// Start a transaction on the current data source.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        let pool = self.current_pool()?;
        Ok(pool.begin().await?)
    }

    /// Close every pool created so far.
    pub async fn close(&self) {
        let pools: Vec<(String, PgPool)> =
            self.pools.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect();
        for (id, pool) in pools {
            pool.close().await;
            tracing::info!(data_source = %id, "connection pool closed");
        }
        self.pools.clear();
    }
}

fn connect_options(id: &str, props: &DataSourceProps) -> AppResult<PgConnectOptions> {
    let url = props.url.as_deref().map(str::trim).filter(|url| !url.is_empty()).ok_or_else(|| {
        ConfigError::ValidationError {
            field: format!("data_sources.{id}.url"),
            message: "connection url is missing".to_string(),
        }
    })?;

    let mut options = PgConnectOptions::from_str(url)?;
    if let Some(username) = &props.username {
        options = options.username(username);
    }
    if let Some(password) = &props.password {
        options = options.password(password);
    }
    Ok(options)
}

fn build_pool(id: &str, props: &DataSourceProps) -> AppResult<PgPool> {
    if let Err(e) = Handle::try_current() {
        tracing::error!(data_source = %id, "connection pool requested outside a Tokio runtime");
        return Err(AppError::Runtime(format!("cannot create pool for '{id}': {e}")));
    }
    let options = connect_options(id, props)?;

    let mut pool_options = PgPoolOptions::new();
    if let Some(pool) = &props.pool {
        if let Some(max) = pool.max_connections {
            pool_options = pool_options.max_connections(max);
        }
        if let Some(min) = pool.min_connections {
            pool_options = pool_options.min_connections(min);
        }
        if let Some(secs) = pool.acquire_timeout_secs {
            pool_options = pool_options.acquire_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = pool.idle_timeout_secs {
            pool_options = pool_options.idle_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = pool.max_lifetime_secs {
            pool_options = pool_options.max_lifetime(Duration::from_secs(secs));
        }
    }

    tracing::info!(data_source = %id, "creating lazy connection pool");
    Ok(pool_options.connect_lazy_with(options))
}
