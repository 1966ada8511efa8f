//! Application configuration management.
//!
//! Settings come from optional `config/default` and `config/{RUN_MODE}`
//! files, overridden by plain environment variables (`ADDR`, `DB_ADDR`,
//! `DB_MAX_OPEN_CONNS`, `DB_MAX_IDLE_CONNS`, `DB_MAX_IDLE_TIME`,
//! `JWT_SECRET`, `QUERY_TIMEOUT`).

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Database connection URL.
    pub db_addr: String,
    /// Maximum number of open connections in the pool.
    #[serde(default = "default_max_conns")]
    pub db_max_open_conns: u32,
    /// Connections kept open while idle.
    #[serde(default = "default_max_conns")]
    pub db_max_idle_conns: u32,
    /// How long an idle connection may live, e.g. `15m`.
    #[serde(default = "default_max_idle_time", deserialize_with = "de_duration")]
    pub db_max_idle_time: Duration,
    /// Secret used to verify bearer tokens.
    pub jwt_secret: String,
    /// Upper bound on every individual store call, e.g. `5s`.
    #[serde(default = "default_query_timeout", deserialize_with = "de_duration")]
    pub query_timeout: Duration,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_conns() -> u32 {
    25
}

fn default_max_idle_time() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_query_timeout() -> Duration {
    Duration::from_secs(5)
}

fn de_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(serde::de::Error::custom)
}

/// Parses durations such as `15m`, `5s`, `1h30m`, `250ms`.
///
/// A bare integer is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        rest = &rest[digits..];

        let unit_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        let part = match &rest[..unit_len] {
            "ms" => Duration::from_millis(value),
            "s" => Duration::from_secs(value),
            "m" => Duration::from_secs(value * 60),
            "h" => Duration::from_secs(value * 3600),
            unit => return Err(format!("unknown duration unit {unit:?} in {input:?}")),
        };
        total += part;
        rest = &rest[unit_len..];
    }
    Ok(total)
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing or malformed.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::default())
            .build()?;

        config.try_deserialize()
    }
}
