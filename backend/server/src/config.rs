use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use tracing::{info, warn};

use crate::error::AppError;

/// Connection string that selects the in-process stores instead of redis.
pub const MEMORY_URL: &str = "memory://";

const SECRETS_DIR: &str = "/run/secrets";

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub redis_url: String,
    pub static_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            port: try_load("PORT", "5000")?,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            static_dir: try_load("STATIC_DIR", "frontend/dist")?,
            jwt_secret: read_secret("JWT_SECRET")?,
            token_ttl_days: try_load("TOKEN_TTL_DAYS", "30")?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.redis_url.starts_with(MEMORY_URL)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            AppError::Config(format!("invalid {key}: {e}"))
        })
}

/// Docker secret file first, then the environment.
fn read_secret(secret_name: &str) -> Result<String, AppError> {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    match read_to_string(&path) {
        Ok(secret) if !secret.trim().is_empty() => return Ok(secret.trim().to_string()),
        Ok(_) => warn!("Secret file {path} is empty"),
        Err(e) => info!("{secret_name} not read from {path} ({e}), trying environment"),
    }

    var(secret_name).ok_or_else(|| {
        warn!("{secret_name} is neither a secret file nor an environment variable");
        AppError::Config(format!("{secret_name} is required"))
    })
}
