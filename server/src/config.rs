use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err("expected \"postgres\" or \"memory\"".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub upload_dir: PathBuf,
    pub import_workers: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store: StoreKind = try_load(&lookup, "RECIPEBOX_STORE", "postgres")?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let import_workers: usize = try_load(&lookup, "IMPORT_WORKERS", "2")?;
        if import_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "IMPORT_WORKERS",
                value: "0".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }

        Ok(Self {
            store,
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", "0.0.0.0:3000")?,
            jwt_secret,
            access_token_ttl_secs: try_load(&lookup, "ACCESS_TOKEN_TTL_SECS", "300")?,
            refresh_token_ttl_secs: try_load(&lookup, "REFRESH_TOKEN_TTL_SECS", "86400")?,
            upload_dir: try_load(&lookup, "UPLOAD_DIR", "media/bulk_uploads")?,
            import_workers,
            max_upload_bytes: try_load(&lookup, "MAX_UPLOAD_BYTES", "20971520")?,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
impl Config {
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            store: StoreKind::Memory,
            database_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: "test-secret".to_string(),
            access_token_ttl_secs: 300,
            refresh_token_ttl_secs: 86400,
            upload_dir,
            import_workers: 1,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}
