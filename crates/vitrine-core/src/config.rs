use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does not load `.env` files. Used by tests
/// and by callers that manage the environment themselves.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let value = or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value <= 0 {
            return Err(invalid(var, format!("must be positive, got {value}")));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let jwt_secret = require("VITRINE_JWT_SECRET")?;

    let env = parse_environment(&or_default("VITRINE_ENV", "development"))?;

    let bind_addr = parse_addr("VITRINE_BIND_ADDR", "0.0.0.0:8000")?;
    let log_level = or_default("VITRINE_LOG_LEVEL", "info");
    let catalog_path = PathBuf::from(or_default("VITRINE_CATALOG_PATH", "./config/catalog.yaml"));

    let public_base_url = match lookup("VITRINE_PUBLIC_BASE_URL") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_base_url(&raw).ok_or_else(|| {
            invalid(
                "VITRINE_PUBLIC_BASE_URL",
                format!("expected an http(s) origin, got '{raw}'"),
            )
        })?),
        _ => None,
    };
    let media_prefix = normalize_media_prefix(&or_default("VITRINE_MEDIA_PREFIX", "/media/"));

    let access_token_ttl_mins = parse_positive_i64("VITRINE_ACCESS_TOKEN_TTL_MINS", "60")?;
    let refresh_token_ttl_mins = parse_positive_i64("VITRINE_REFRESH_TOKEN_TTL_MINS", "10080")?;

    let db_max_connections = parse_u32("VITRINE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("VITRINE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("VITRINE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "VITRINE_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds VITRINE_DB_MAX_CONNECTIONS {db_max_connections}"),
        ));
    }

    let rate_limit_max_requests = parse_usize("VITRINE_RATE_LIMIT_MAX_REQUESTS", "120")?;
    let rate_limit_window_secs = parse_u64("VITRINE_RATE_LIMIT_WINDOW_SECS", "60")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        jwt_secret,
        public_base_url,
        media_prefix,
        access_token_ttl_mins,
        refresh_token_ttl_mins,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VITRINE_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

/// Accepts `http(s)://host[:port]` with an optional trailing slash.
fn parse_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))?;
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(trimmed.to_string())
}

fn normalize_media_prefix(raw: &str) -> String {
    let inner = raw.trim().trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{inner}/")
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
