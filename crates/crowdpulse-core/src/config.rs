use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parse `var` with `T::from_str`, falling back to `default` when unset.
fn parse_or_default<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// Like [`parse_or_default`] but yields `None` when the variable is unset or blank.
fn parse_optional<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` naming the first variable that fails
/// to parse or validate.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };
    let optional_path = |var: &str| -> Option<PathBuf> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    };

    let env = parse_environment(&or_default("CROWDPULSE_ENV", "development"))?;
    let log_level = or_default("CROWDPULSE_LOG_LEVEL", "info");
    let targets_path = optional_path("CROWDPULSE_TARGETS_PATH");
    let lexicon_path = optional_path("CROWDPULSE_LEXICON_PATH");
    let cache_dir = optional_path("CROWDPULSE_CACHE_DIR");

    let fetch_timeout_secs = parse_or_default(&lookup, "CROWDPULSE_FETCH_TIMEOUT_SECS", 30u64)?;
    let user_agent = or_default("CROWDPULSE_USER_AGENT", DEFAULT_USER_AGENT);
    let max_in_flight = parse_or_default(&lookup, "CROWDPULSE_MAX_IN_FLIGHT", 4usize)?;
    let pacing_min_ms = parse_or_default(&lookup, "CROWDPULSE_PACING_MIN_MS", 2_000u64)?;
    let pacing_max_ms = parse_or_default(&lookup, "CROWDPULSE_PACING_MAX_MS", 4_000u64)?;
    let max_retries = parse_or_default(&lookup, "CROWDPULSE_MAX_RETRIES", 0u32)?;
    let retry_backoff_base_ms =
        parse_or_default(&lookup, "CROWDPULSE_RETRY_BACKOFF_BASE_MS", 1_000u64)?;
    let max_posts = parse_or_default(&lookup, "CROWDPULSE_MAX_POSTS", 100usize)?;
    let run_timeout_secs = parse_optional(&lookup, "CROWDPULSE_RUN_TIMEOUT_SECS")?;

    let eastmoney_min_views = parse_or_default(&lookup, "CROWDPULSE_EASTMONEY_MIN_VIEWS", 100u64)?;
    let xueqiu_min_followers =
        parse_or_default(&lookup, "CROWDPULSE_XUEQIU_MIN_FOLLOWERS", 1_000u64)?;
    let xueqiu_min_engagement =
        parse_or_default(&lookup, "CROWDPULSE_XUEQIU_MIN_ENGAGEMENT", 50u64)?;
    let xueqiu_min_content_chars =
        parse_or_default(&lookup, "CROWDPULSE_XUEQIU_MIN_CONTENT_CHARS", 50usize)?;

    if max_in_flight == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CROWDPULSE_MAX_IN_FLIGHT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if pacing_min_ms > pacing_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "CROWDPULSE_PACING_MIN_MS".to_string(),
            reason: format!(
                "must be less than or equal to CROWDPULSE_PACING_MAX_MS ({pacing_min_ms} > {pacing_max_ms})"
            ),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        targets_path,
        lexicon_path,
        cache_dir,
        fetch_timeout_secs,
        user_agent,
        max_in_flight,
        pacing_min_ms,
        pacing_max_ms,
        max_retries,
        retry_backoff_base_ms,
        max_posts,
        run_timeout_secs,
        eastmoney_min_views,
        xueqiu_min_followers,
        xueqiu_min_engagement,
        xueqiu_min_content_chars,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CROWDPULSE_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
