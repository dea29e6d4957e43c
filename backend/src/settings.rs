//! Server settings loaded via OrthoConfig.
//!
//! Values are layered from defaults, an optional configuration file, the
//! `CHARSHEET_*` environment, and command-line flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;
use ortho_config::OrthoConfig;
use rand::RngCore;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::outbound::tokens::MIN_SECRET_LEN;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_TOKEN_TTL_MINUTES: u32 = 60;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Errors raised while interpreting settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value}: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("token secret at {path} must be at least {min} bytes")]
    SecretTooShort { path: PathBuf, min: usize },
    #[error("no token secret configured; set CHARSHEET_TOKEN_SECRET_FILE")]
    SecretMissing,
}

/// Settings for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CHARSHEET")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// File holding the access-token signing secret.
    pub token_secret_file: Option<PathBuf>,
    /// Permit a random per-process secret when no file is configured.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
    /// Access-token lifetime in minutes.
    pub token_ttl_minutes: Option<u32>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    pub fn token_ttl(&self) -> Duration {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        Duration::minutes(i64::from(minutes))
    }

    /// Load the signing secret.
    ///
    /// Without a secret file, debug builds and deployments that set
    /// `allow_ephemeral_secret` get a random secret; tokens then stop
    /// validating on restart.
    pub fn token_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        match &self.token_secret_file {
            Some(path) => {
                let bytes = std::fs::read(path).map(Zeroizing::new).map_err(|source| {
                    SettingsError::SecretRead {
                        path: path.clone(),
                        source,
                    }
                })?;
                if bytes.len() < MIN_SECRET_LEN {
                    return Err(SettingsError::SecretTooShort {
                        path: path.clone(),
                        min: MIN_SECRET_LEN,
                    });
                }
                Ok(bytes)
            }
            None if self.allow_ephemeral_secret || cfg!(debug_assertions) => {
                let mut bytes = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
                rand::thread_rng().fill_bytes(&mut bytes);
                Ok(bytes)
            }
            None => Err(SettingsError::SecretMissing),
        }
    }
}
