//! CLI tool for checking router configs and inspecting routing decisions.

#![allow(clippy::print_stdout, reason = "CLI tool outputs to stdout")]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shard_router_core::modules::config::{load_config, CONFIG_ENV};
use shard_router_core::modules::logger::init_tracing;
use shard_router_core::{
    context, AppError, DataSourceRegistry, DbRoute, DbRouterJoinPoint, HashRoutingStrategy,
    RouteArg, RouterConfig, ShardSelector, StatementRewriter,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "shard-router", author, version, about, long_about = None)]
struct Cli {
    /// Router config file (JSON)
    #[arg(long, global = true, env = CONFIG_ENV, default_value = "shard-router.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validates the config and prints the shard layout
    Check,
    /// Prints where a routing key value lands
    Route {
        /// Routing key value
        #[arg(long)]
        key: String,
        /// Attribute name to read the value from, instead of the configured key
        #[arg(long)]
        key_name: Option<String>,
    },
    /// Routes a key value and prints the rewritten statement
    Rewrite {
        /// Routing key value
        #[arg(long)]
        key: String,
        /// Statement to rewrite
        #[arg(long)]
        sql: String,
    },
}

struct Routed {
    db_key: String,
    tb_key: String,
    data_source: String,
    sql: Option<String>,
}

fn load(path: &Path) -> Result<RouterConfig> {
    load_config(path).with_context(|| format!("loading router config from {}", path.display()))
}

fn join_point(config: &RouterConfig) -> Result<DbRouterJoinPoint> {
    let strategy = HashRoutingStrategy::new(config.shard.clone())?;
    Ok(DbRouterJoinPoint::from_hash_strategy(strategy))
}

async fn route(
    config: &RouterConfig,
    key: &str,
    key_name: Option<&str>,
    sql: Option<&str>,
) -> Result<Routed> {
    let join_point = join_point(config)?;
    let selector = ShardSelector::from_config(config);
    let rewriter = StatementRewriter::new(true);
    let (selector, rewriter) = (&selector, &rewriter);

    let record: BTreeMap<String, String> =
        key_name.map(|name| (name.to_string(), key.to_string())).into_iter().collect();
    let (db_route, args) = match key_name {
        Some(name) => (DbRoute::with_key(name), [RouteArg::Record(&record)]),
        None => (DbRoute::new(), [RouteArg::Value(key)]),
    };

    let routed = join_point
        .around(&db_route, &args, |decision| async move {
            let ctx = context::current();
            let sql = sql.map(|sql| rewriter.rewrite(sql).map(|sql| sql.into_owned())).transpose()?;
            Ok::<_, AppError>(Routed {
                db_key: decision.db_key(),
                tb_key: decision.tb_key(),
                data_source: selector.resolve_for(&ctx),
                sql,
            })
        })
        .await?;
    Ok(routed)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");

    let cli = Cli::parse();
    let config = load(&cli.config)?;

    match cli.command {
        Commands::Check => {
            let registry = DataSourceRegistry::from_config(&config)?;
            info!("Config {:?} is valid", cli.config);

            println!(
                "shards: {} databases x {} tables ({} slots), router key '{}'",
                config.shard.db_count,
                config.shard.tb_count,
                config.shard.slot_count(),
                config.shard.router_key
            );
            if !config.shard.slot_count().is_power_of_two() {
                println!("warning: slot count is not a power of two, some tables stay empty");
            }
            println!("default data source: {}", config.default_data_source);
            for id in registry.data_source_ids() {
                let url = registry.props(id).and_then(|props| props.url.as_deref()).unwrap_or("-");
                println!("  {id}: {url}");
            }
        },
        Commands::Route { key, key_name } => {
            let routed = route(&config, &key, key_name.as_deref(), None).await?;
            println!("db key:      {}", routed.db_key);
            println!("table key:   {}", routed.tb_key);
            println!("data source: {}", routed.data_source);
        },
        Commands::Rewrite { key, sql } => {
            let routed = route(&config, &key, None, Some(&sql)).await?;
            info!("Routed to {} table {}", routed.data_source, routed.tb_key);
            println!("{}", routed.sql.unwrap_or(sql));
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shard_router_types::{DataSourceProps, ShardConfig};

    fn config() -> RouterConfig {
        RouterConfig::new(ShardConfig::new(2, 4, "uId").unwrap(), "db00")
            .with_data_source("db00", DataSourceProps::with_url("postgres://h/db00"))
            .with_data_source("db01", DataSourceProps::with_url("postgres://h/db01"))
            .with_data_source("db02", DataSourceProps::with_url("postgres://h/db02"))
    }

    #[tokio::test]
    async fn test_route_value() {
        let routed = route(&config(), "5", None, None).await.unwrap();
        assert_eq!(routed.db_key, "02");
        assert_eq!(routed.tb_key, "001");
        assert_eq!(routed.data_source, "db02");
        assert!(routed.sql.is_none());
    }

    #[tokio::test]
    async fn test_route_by_key_name() {
        let routed = route(&config(), "hello", Some("userId"), None).await.unwrap();
        assert_eq!(routed.data_source, "db01");
        assert_eq!(routed.tb_key, "003");
    }

    #[tokio::test]
    async fn test_rewrite() {
        let routed =
            route(&config(), "100", None, Some("select * from user where uId = ?")).await.unwrap();
        assert_eq!(routed.sql.as_deref(), Some("select * from user_001 where uId = ?"));
    }

    #[test]
    fn test_cli_parses_route() {
        let cli = Cli::parse_from(["shard-router", "--config", "r.json", "route", "--key", "5"]);
        assert_eq!(cli.config, PathBuf::from("r.json"));
        assert!(matches!(cli.command, Commands::Route { ref key, key_name: None } if key == "5"));
    }
}
