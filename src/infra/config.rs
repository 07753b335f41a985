//! Centralized configuration (environment variables + defaults).

use anyhow::Context;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 5000;

/// Largest accepted request body (images travel inline as base64).
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Interface to bind (default `0.0.0.0`).
pub fn bind_addr() -> anyhow::Result<IpAddr> {
    let v = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
    v.trim()
        .parse::<IpAddr>()
        .with_context(|| format!("BIND_ADDR must be an IP address (got {:?})", v))
}

/// Listening port (default 5000).
pub fn port() -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(v) => v
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PORT must be a valid port number (got {:?})", v)),
        Err(_) => Ok(DEFAULT_PORT),
    }
}

/// JSON file holding the certificate records.
pub fn certificates_file() -> anyhow::Result<PathBuf> {
    let v = std::env::var("CERTIFICATES_FILE").unwrap_or_else(|_| "certificates.json".to_string());
    expand_path(&v)
}

/// Directory the uploaded images are written to.
pub fn images_dir() -> anyhow::Result<PathBuf> {
    let v = std::env::var("IMAGES_DIR").unwrap_or_else(|_| "public/images".to_string());
    expand_path(&v)
}

/// Request body limit in bytes (default 50 MiB).
pub fn max_body_bytes() -> anyhow::Result<usize> {
    match std::env::var("MAX_BODY_BYTES") {
        Ok(v) => {
            let n = v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("MAX_BODY_BYTES must be a byte count (got {:?})", v))?;
            Ok(n.max(1))
        }
        Err(_) => Ok(DEFAULT_MAX_BODY_BYTES),
    }
}

// Accepts `~` and `$VAR` so `.env` files can stay portable.
fn expand_path(raw: &str) -> anyhow::Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("failed to expand path {:?}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Where the store keeps its state.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub certificates_file: PathBuf,
    pub images_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(certificates_file: impl Into<PathBuf>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            certificates_file: certificates_file.into(),
            images_dir: images_dir.into(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            certificates_file: certificates_file()?,
            images_dir: images_dir()?,
        })
    }
}

/// Everything `api_server` needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_body_bytes: usize,
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Loads `.env` (if present) and reads the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Ok(Self {
            bind: SocketAddr::new(bind_addr()?, port()?),
            max_body_bytes: max_body_bytes()?,
            store: StoreConfig::from_env()?,
        })
    }
}
