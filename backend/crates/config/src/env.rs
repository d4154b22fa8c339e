use ledgersync_common::error::{LedgerError, LedgerResult};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub queue_name: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> LedgerResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_var("DATABASE_URL")?,
            redis_url: get_var_or("REDIS_URL", "redis://127.0.0.1:6379"),
            host: get_var_or("HOST", "0.0.0.0"),
            port: parse_var_or("PORT", 8080)?,
            log_level: get_var_or("LOG_LEVEL", "info"),
            queue_name: get_var_or("SYNC_QUEUE_NAME", "full-sync-requests"),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Tuning for the full-sync worker.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Retries after the first attempt, per entity type.
    pub max_retry_count: u32,
    pub retry_delay_secs: u64,
    /// Deliveries of one message before the queue dead-letters it.
    pub max_deliveries: u32,
    pub poll_timeout_secs: u64,
    /// Use entity-state checkpoints for incremental pulls instead of full pulls.
    pub incremental: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retry_count: 2,
            retry_delay_secs: 2,
            max_deliveries: 5,
            poll_timeout_secs: 5,
            incremental: false,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> LedgerResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_retry_count: parse_var_or("SYNC_MAX_RETRY_COUNT", defaults.max_retry_count)?,
            retry_delay_secs: parse_var_or("SYNC_RETRY_DELAY_SECS", defaults.retry_delay_secs)?,
            max_deliveries: parse_var_or("SYNC_MAX_DELIVERIES", defaults.max_deliveries)?,
            poll_timeout_secs: parse_var_or("SYNC_POLL_TIMEOUT_SECS", defaults.poll_timeout_secs)?,
            incremental: parse_var_or("SYNC_INCREMENTAL", defaults.incremental)?,
        })
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn get_var(key: &str) -> LedgerResult<String> {
    env::var(key).map_err(|_| LedgerError::Config(format!("{key} is required but not set")))
}

/// Value of `key`, or `default` when unset.
pub fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse `key` when set, else `default`. A malformed value is a `Config` error.
pub fn parse_var_or<T>(key: &str, default: T) -> LedgerResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| LedgerError::Config(format!("invalid {key}: {e}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn config_from_env_succeeds_with_required_vars() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("DATABASE_URL", "postgres://localhost/ledgersync_test");
        env::remove_var("PORT");
        env::remove_var("SYNC_QUEUE_NAME");

        let cfg = AppConfig::from_env().expect("should parse config");
        assert_eq!(cfg.database_url, "postgres://localhost/ledgersync_test");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.queue_name, "full-sync-requests");

        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn config_from_env_fails_without_database_url() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::remove_var("DATABASE_URL");
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn config_rejects_non_numeric_port() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("DATABASE_URL", "postgres://localhost/ledgersync_test");
        env::set_var("PORT", "eighty");
        let result = AppConfig::from_env();
        assert!(matches!(result, Err(LedgerError::Config(_))));

        env::remove_var("PORT");
        env::remove_var("DATABASE_URL");
    }

    #[test]
    fn sync_config_defaults_to_two_retries_two_seconds_apart() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        for key in [
            "SYNC_MAX_RETRY_COUNT",
            "SYNC_RETRY_DELAY_SECS",
            "SYNC_MAX_DELIVERIES",
            "SYNC_POLL_TIMEOUT_SECS",
            "SYNC_INCREMENTAL",
        ] {
            env::remove_var(key);
        }

        let cfg = SyncConfig::from_env().expect("defaults should parse");
        assert_eq!(cfg.max_retry_count, 2);
        assert_eq!(cfg.retry_delay(), Duration::from_secs(2));
        assert!(!cfg.incremental);
    }

    #[test]
    fn sync_config_reads_overrides() {
        let _guard = ENV_LOCK.lock().expect("env lock poisoned");

        env::set_var("SYNC_MAX_RETRY_COUNT", "4");
        env::set_var("SYNC_INCREMENTAL", "true");
        let cfg = SyncConfig::from_env().expect("overrides should parse");
        assert_eq!(cfg.max_retry_count, 4);
        assert!(cfg.incremental);

        env::remove_var("SYNC_MAX_RETRY_COUNT");
        env::remove_var("SYNC_INCREMENTAL");
    }

    #[test]
    fn bind_addr_formats_correctly() {
        let cfg = AppConfig {
            database_url: String::new(),
            redis_url: String::new(),
            host: "127.0.0.1".to_owned(),
            port: 3000,
            log_level: "debug".to_owned(),
            queue_name: "q".to_owned(),
        };
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
    }
}
