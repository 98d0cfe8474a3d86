use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const SESSION_FILE_NAME: &str = ".gatorconfig.json";
pub(crate) const DEFAULT_USER_AGENT: &str = "gator/0.1 (+feed-aggregator)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or no session file location can
/// be determined.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is invalid or no session file location can
/// be determined.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key), dirs::home_dir())
}

/// Build application configuration using the provided env-var lookup function.
///
/// `home` is only consulted when `GATOR_CONFIG_PATH` is unset.
fn build_app_config<F>(lookup: F, home: Option<PathBuf>) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
    let log_level = or_default("GATOR_LOG_LEVEL", "info");

    let session_path = match lookup("GATOR_CONFIG_PATH") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => home
            .map(|dir| dir.join(SESSION_FILE_NAME))
            .ok_or(ConfigError::NoSessionPath)?,
    };

    let db_max_connections = parse_u32("GATOR_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("GATOR_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "GATOR_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "must not exceed GATOR_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("GATOR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("GATOR_FETCH_TIMEOUT_SECS", "10")?;
    if fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GATOR_FETCH_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("GATOR_USER_AGENT", DEFAULT_USER_AGENT);

    Ok(AppConfig {
        database_url,
        log_level,
        session_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        user_agent,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
