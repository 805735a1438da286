use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub import_max_upload_bytes: usize,
    pub import_tx_max_wait_secs: u64,
    pub import_tx_timeout_secs: u64,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Tunables the import pipeline needs at request time.
#[derive(Debug, Clone, Copy)]
pub struct ImportSettings {
    pub max_upload_bytes: usize,
    pub tx_max_wait: Duration,
    pub tx_timeout: Duration,
}

/// Room for multipart boundaries, part headers and the `testId` field on
/// top of the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

impl ImportSettings {
    /// Request body limit for the upload route. Larger than the file limit
    /// so an oversized file still reaches the handler and gets a structured
    /// error instead of a truncated multipart stream.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            tx_max_wait: Duration::from_secs(10),
            tx_timeout: Duration::from_secs(15),
        }
    }
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = ImportSettings::default();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret: get_env("JWT_SECRET")?,
            import_max_upload_bytes: get_env_positive_or(
                "IMPORT_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            )?,
            import_tx_max_wait_secs: get_env_positive_or(
                "IMPORT_TX_MAX_WAIT_SECS",
                defaults.tx_max_wait.as_secs(),
            )?,
            import_tx_timeout_secs: get_env_positive_or(
                "IMPORT_TX_TIMEOUT_SECS",
                defaults.tx_timeout.as_secs(),
            )?,
            log_format: match env::var("LOG_FORMAT").ok().as_deref() {
                Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            max_upload_bytes: self.import_max_upload_bytes,
            tx_max_wait: Duration::from_secs(self.import_tx_max_wait_secs),
            tx_timeout: Duration::from_secs(self.import_tx_timeout_secs),
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn get_env_positive_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    require_positive(name, get_env_parse_or(name, default)?)
}

fn require_positive<T: Default + PartialEq>(name: &str, value: T) -> Result<T> {
    if value == T::default() {
        return Err(Error::Config(format!("{} must be greater than zero", name)));
    }
    Ok(value)
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_are_rejected() {
        assert!(matches!(
            require_positive("IMPORT_TX_TIMEOUT_SECS", 0u64),
            Err(Error::Config(msg)) if msg.contains("IMPORT_TX_TIMEOUT_SECS")
        ));
        assert!(require_positive("IMPORT_MAX_UPLOAD_BYTES", 0usize).is_err());
        assert_eq!(require_positive("IMPORT_TX_TIMEOUT_SECS", 15u64).unwrap(), 15);
    }

    #[test]
    fn body_limit_leaves_room_for_multipart_framing() {
        let settings = ImportSettings {
            max_upload_bytes: 1000,
            ..ImportSettings::default()
        };
        assert_eq!(settings.request_body_limit(), 1000 + MULTIPART_OVERHEAD_BYTES);

        let unbounded = ImportSettings {
            max_upload_bytes: usize::MAX,
            ..ImportSettings::default()
        };
        assert_eq!(unbounded.request_body_limit(), usize::MAX);
    }
}
