//! Router configuration file (JSON) with environment overrides.

use shard_router_types::{ConfigError, RouterConfig};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SHARD_ROUTER_CONFIG";
/// Overrides `db_count`.
pub const DB_COUNT_ENV: &str = "SHARD_ROUTER_DB_COUNT";
/// Overrides `tb_count`.
pub const TB_COUNT_ENV: &str = "SHARD_ROUTER_TB_COUNT";
/// Overrides `router_key`.
pub const ROUTER_KEY_ENV: &str = "SHARD_ROUTER_ROUTER_KEY";

/// Load the router config at `path`, apply environment overrides and
/// validate the result.
pub fn load_config(path: &Path) -> AppResult<RouterConfig> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.display().to_string() }.into());
    }

    let content = fs::read_to_string(path)?;
    let config: RouterConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))?;
    let config = apply_overrides(config, |name| std::env::var(name).ok())?;
    config.validate()?;

    tracing::info!(
        path = %path.display(),
        db_count = config.shard.db_count,
        tb_count = config.shard.tb_count,
        router_key = %config.shard.router_key,
        "router config loaded"
    );
    Ok(config)
}

/// Apply shard layout overrides looked up by variable name.
pub fn apply_overrides<F>(mut config: RouterConfig, lookup: F) -> Result<RouterConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(DB_COUNT_ENV) {
        config.shard.db_count = parse_count(DB_COUNT_ENV, &raw)?;
    }
    if let Some(raw) = lookup(TB_COUNT_ENV) {
        config.shard.tb_count = parse_count(TB_COUNT_ENV, &raw)?;
    }
    if let Some(key) = lookup(ROUTER_KEY_ENV) {
        config.shard.router_key = key.trim().to_string();
    }
    Ok(config)
}

fn parse_count(name: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::ValidationError {
        field: name.to_string(),
        message: format!("'{raw}' is not a non-negative integer"),
    })
}

/// Save `config` to `path`.
pub fn save_config(path: &Path, config: &RouterConfig) -> AppResult<()> {
    let temp_path = temp_path(path);
    let content = serde_json::to_string_pretty(config)?;

    // Atomic write
    fs::write(&temp_path, content).map_err(|e| ConfigError::from_io_error(&e))?;
    fs::rename(&temp_path, path).map_err(|e| ConfigError::from_io_error(&e))?;
    Ok(())
}

/// Load, modify, validate and save the config at `path`.
pub fn update_config<F>(path: &Path, updater: F) -> AppResult<RouterConfig>
where
    F: FnOnce(&mut RouterConfig),
{
    let mut config = load_config(path)?;
    updater(&mut config);
    config.validate()?;
    save_config(path, &config)?;
    Ok(config)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use shard_router_types::{DataSourceProps, RouterError, ShardConfig};
    use std::collections::HashMap;

    const SAMPLE: &str = r#"{
        "db_count": 2,
        "tb_count": 4,
        "router_key": "uId",
        "default_data_source": "db00",
        "global": { "username": "router", "pool": { "max_connections": 8 } },
        "data_sources": {
            "db00": { "url": "postgres://localhost/main" },
            "db01": { "url": "postgres://localhost/shard1" },
            "db02": { "url": "postgres://localhost/shard2" }
        }
    }"#;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    fn sample() -> RouterConfig {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.shard, ShardConfig::new(2, 4, "uId").unwrap());
        assert_eq!(config.default_data_source, "db00");
        assert_eq!(config.data_sources.len(), 3);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load_config(&path), Err(AppError::Config(ConfigError::NotFound { .. }))));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        fs::write(&path, "{ db_count: 2").unwrap();
        assert!(matches!(load_config(&path), Err(AppError::Config(ConfigError::ParseError { .. }))));
    }

    #[test]
    fn test_load_rejects_invalid_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        fs::write(&path, SAMPLE.replace("\"tb_count\": 4", "\"tb_count\": 0")).unwrap();
        assert!(matches!(
            load_config(&path),
            Err(AppError::Router(RouterError::InvalidShardConfig { .. }))
        ));
    }

    #[test]
    fn test_overrides_applied() {
        let config = apply_overrides(
            sample(),
            lookup(&[(DB_COUNT_ENV, "1"), (TB_COUNT_ENV, " 8 "), (ROUTER_KEY_ENV, "userId")]),
        )
        .unwrap();

        assert_eq!(config.shard.db_count, 1);
        assert_eq!(config.shard.tb_count, 8);
        assert_eq!(config.shard.router_key, "userId");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_overrides_keeps_file_values() {
        let config = apply_overrides(sample(), lookup(&[])).unwrap();
        assert_eq!(config, sample());
    }

    #[test]
    fn test_bad_override_rejected() {
        let err = apply_overrides(sample(), lookup(&[(TB_COUNT_ENV, "four")])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == TB_COUNT_ENV));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        let config = sample().with_data_source("db03", DataSourceProps::with_url("postgres://h/db03"));

        save_config(&path, &config).unwrap();
        assert!(!temp_path(&path).exists());

        let saved: RouterConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, config);
    }

    #[test]
    fn test_update_config_validates_before_saving() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.json");
        fs::write(&path, SAMPLE).unwrap();

        let updated = update_config(&path, |config| config.shard.tb_count = 16).unwrap();
        assert_eq!(updated.shard.tb_count, 16);

        let rejected = update_config(&path, |config| config.shard.db_count = 5);
        assert!(rejected.is_err());
        assert_eq!(load_config(&path).unwrap().shard.db_count, 2);
    }
}
