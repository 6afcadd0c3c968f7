use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use spots::remote::{DEFAULT_BUCKET, DEFAULT_TABLE};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("Secret {0} not found in /run/secrets or the environment")]
    MissingSecret(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    pub table: String,
    pub bucket: String,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let max_upload_bytes = upload_limit(try_load("MAX_UPLOAD_MB", "10")?)?;

        Ok(Self {
            port: try_load("RUST_PORT", "3000")?,
            supabase_url: try_load("SUPABASE_URL", "http://localhost:54321")?,
            anon_key: read_secret("SUPABASE_ANON_KEY")?,
            service_role_key: read_secret("SUPABASE_SERVICE_ROLE_KEY")?,
            table: try_load("SPOTS_TABLE", DEFAULT_TABLE)?,
            bucket: try_load("SPOTS_BUCKET", DEFAULT_BUCKET)?,
            max_upload_bytes,
        })
    }
}

fn upload_limit(megabytes: usize) -> Result<usize, ConfigError> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| ConfigError::Invalid {
            key: "MAX_UPLOAD_MB",
            message: format!("{megabytes} MB is too large"),
        })
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                message: e.to_string(),
            }
        })
}

fn read_secret(secret_name: &'static str) -> Result<String, ConfigError> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            info!("Failed to read {secret_name} from file ({e}), trying environment");
            env::var(secret_name).map(|s| s.trim().to_string())
        })
        .map_err(|_| {
            warn!("Secret {secret_name} not found");
            ConfigError::MissingSecret(secret_name)
        })
}
