//! Process configuration read from the environment.
//!
//! `main` loads `.env` first, then builds a [`Config`] once and hands the
//! pieces to the pool and the shared state. Everything except `DATABASE_URL`
//! falls back to a default when unset or unparsable.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_DIAGRAM_WIDTH: i32 = 800;
const DEFAULT_DIAGRAM_HEIGHT: i32 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Canvas size used when a diagram is created without one.
    pub default_width: i32,
    pub default_height: i32,
}

impl Config {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `DATABASE_URL` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `DATABASE_URL` is absent or blank.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            port: env_parse(get("PORT"), DEFAULT_PORT),
            db_max_connections: env_parse(get("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
            default_width: positive_or(get("DIAGRAM_DEFAULT_WIDTH"), DEFAULT_DIAGRAM_WIDTH),
            default_height: positive_or(get("DIAGRAM_DEFAULT_HEIGHT"), DEFAULT_DIAGRAM_HEIGHT),
        })
    }
}

/// Parse a raw environment value, falling back to `default` when missing or invalid.
pub(crate) fn env_parse<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn positive_or(raw: Option<String>, default: i32) -> i32 {
    let value = env_parse(raw, default);
    if value > 0 { value } else { default }
}
