use crate::app_config::{AppConfig, Environment};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("PLACARDB_ENV", "development"));

    let log_level = or_default("PLACARDB_LOG_LEVEL", "info");
    let leagues_path = PathBuf::from(or_default("PLACARDB_LEAGUES_PATH", "./config/leagues.yaml"));
    let render_endpoint = lookup("PLACARDB_RENDER_ENDPOINT").ok();

    let db_max_connections = parse_u32("PLACARDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PLACARDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PLACARDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("PLACARDB_FETCH_TIMEOUT_SECS", "60")?;
    let user_agent = or_default(
        "PLACARDB_USER_AGENT",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    );
    let max_concurrent_matches = parse_usize("PLACARDB_MAX_CONCURRENT_MATCHES", "2")?;
    let min_request_delay_ms = parse_u64("PLACARDB_MIN_REQUEST_DELAY_MS", "500")?;
    let max_request_delay_ms = parse_u64("PLACARDB_MAX_REQUEST_DELAY_MS", "5000")?;
    let fetch_max_retries = parse_u32("PLACARDB_FETCH_MAX_RETRIES", "2")?;
    let fetch_backoff_base_ms = parse_u64("PLACARDB_FETCH_BACKOFF_BASE_MS", "1000")?;

    if min_request_delay_ms > max_request_delay_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "PLACARDB_MIN_REQUEST_DELAY_MS".to_string(),
            reason: format!(
                "min delay {min_request_delay_ms}ms exceeds max delay {max_request_delay_ms}ms"
            ),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        leagues_path,
        render_endpoint,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        user_agent,
        max_concurrent_matches,
        min_request_delay_ms,
        max_request_delay_ms,
        fetch_max_retries,
        fetch_backoff_base_ms,
    })
}

fn parse_environment(raw: &str) -> Environment {
    match raw.to_ascii_lowercase().as_str() {
        "production" | "prod" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
