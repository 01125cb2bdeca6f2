//! Process-wide engine configuration: notification window sizes, refresh
//! cadence, and store-call budgets. Loaded once at startup; not persisted
//! per user.

use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::errors::{EngineError, EngineResult};

const CONFIG_DIR_NAME: &str = "obligation_core";
const CONFIG_FILE_NAME: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Notification window and scheduling policy recognized by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_daily_lookahead_hours")]
    pub daily_lookahead_hours: i64,
    #[serde(default = "EngineConfig::default_lookahead_days")]
    pub default_lookahead_days: i64,
    #[serde(default = "EngineConfig::default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
    #[serde(default = "EngineConfig::default_max_catch_up_iterations")]
    pub max_catch_up_iterations: u32,
    #[serde(default = "EngineConfig::default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "EngineConfig::default_read_retry_attempts")]
    pub read_retry_attempts: u32,
    #[serde(default = "EngineConfig::default_read_retry_backoff_ms")]
    pub read_retry_backoff_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_lookahead_hours: Self::default_daily_lookahead_hours(),
            default_lookahead_days: Self::default_lookahead_days(),
            refresh_interval_ms: Self::default_refresh_interval_ms(),
            max_catch_up_iterations: Self::default_max_catch_up_iterations(),
            store_timeout_ms: Self::default_store_timeout_ms(),
            read_retry_attempts: Self::default_read_retry_attempts(),
            read_retry_backoff_ms: Self::default_read_retry_backoff_ms(),
        }
    }
}

impl EngineConfig {
    fn default_daily_lookahead_hours() -> i64 {
        5
    }

    fn default_lookahead_days() -> i64 {
        5
    }

    fn default_refresh_interval_ms() -> u64 {
        60_000
    }

    fn default_max_catch_up_iterations() -> u32 {
        1_000
    }

    fn default_store_timeout_ms() -> u64 {
        10_000
    }

    fn default_read_retry_attempts() -> u32 {
        3
    }

    fn default_read_retry_backoff_ms() -> u64 {
        200
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn read_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.read_retry_backoff_ms)
    }

    /// Rejects settings that would make the engine misbehave at runtime.
    pub fn validate(&self) -> EngineResult<()> {
        if self.daily_lookahead_hours < 0 {
            return Err(EngineError::Validation(
                "daily_lookahead_hours must be non-negative".into(),
            ));
        }
        if self.default_lookahead_days < 0 {
            return Err(EngineError::Validation(
                "default_lookahead_days must be non-negative".into(),
            ));
        }
        if self.max_catch_up_iterations == 0 {
            return Err(EngineError::Validation(
                "max_catch_up_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Loads and persists the engine configuration as JSON on disk.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> EngineResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| EngineError::Validation("no configuration directory available".into()))?
            .join(CONFIG_DIR_NAME);
        Ok(Self::with_path(base.join(CONFIG_FILE_NAME)))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> EngineResult<EngineConfig> {
        let config = if self.path.exists() {
            let data = fs::read_to_string(&self.path)
                .map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
            serde_json::from_str(&data)
                .map_err(|err| EngineError::Validation(format!("malformed config: {err}")))?
        } else {
            EngineConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> EngineResult<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| EngineError::Validation(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)
            .map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
    }
    let mut file =
        File::create(path).map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
    file.write_all(data.as_bytes())
        .map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
    file.flush()
        .map_err(|err| EngineError::StoreUnavailable(err.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recognized_options() {
        let config = EngineConfig::default();
        assert_eq!(config.daily_lookahead_hours, 5);
        assert_eq!(config.default_lookahead_days, 5);
        assert_eq!(config.refresh_interval_ms, 60_000);
        assert_eq!(config.max_catch_up_iterations, 1_000);
    }

    #[test]
    fn load_returns_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));
        let config = manager.load().unwrap();
        assert_eq!(config.refresh_interval_ms, 60_000);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));
        let mut config = EngineConfig::default();
        config.default_lookahead_days = 9;
        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded.default_lookahead_days, 9);
    }

    #[test]
    fn path_points_at_the_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.json");
        let manager = ConfigManager::with_path(file.clone());
        assert_eq!(manager.path(), file.as_path());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "daily_lookahead_hours": 2 }"#).unwrap();
        let config = ConfigManager::with_path(path).load().unwrap();
        assert_eq!(config.daily_lookahead_hours, 2);
        assert_eq!(config.default_lookahead_days, 5);
    }

    #[test]
    fn validate_rejects_zero_iteration_cap() {
        let mut config = EngineConfig::default();
        config.max_catch_up_iterations = 0;
        assert!(config.validate().is_err());
    }
}
