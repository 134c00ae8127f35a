use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: Some(4),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

/// Backend selection. `connection` is opaque to everything but the backend
/// constructor.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_connection")]
    pub connection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { connection: default_connection() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_shutdown_timeout() -> u64 { 10 }
fn default_connection() -> String { "mysql".into() }

/// Read `CONFIG_PATH` (default `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let cfg: AppConfig = toml::from_str(&content).with_context(|| format!("parsing {path}"))?;
    Ok(cfg)
}

impl AppConfig {
    /// File, then environment overrides, then validation.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env_overrides(|k| std::env::var(k).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `SERVER_HOST`, `SERVER_PORT`, `TOKIO_WORKER_THREADS`,
    /// `SHUTDOWN_TIMEOUT_SECS` and `STORE_CONNECTION` from `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT is not a valid port: {port}"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS") {
            let w = w
                .trim()
                .parse()
                .map_err(|_| anyhow!("TOKIO_WORKER_THREADS is not a number: {w}"))?;
            self.server.worker_threads = Some(w);
        }
        if let Some(t) = lookup("SHUTDOWN_TIMEOUT_SECS") {
            self.server.shutdown_timeout_secs = t
                .trim()
                .parse()
                .map_err(|_| anyhow!("SHUTDOWN_TIMEOUT_SECS is not a number: {t}"))?;
        }
        if let Some(conn) = lookup("STORE_CONNECTION") {
            self.store.connection = conn;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(anyhow!("server.shutdown_timeout_secs must be > 0"));
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Listen address. Port 0 asks the OS for a free port.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim();
        let raw = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.port)
        } else {
            format!("{host}:{}", self.port)
        };
        raw.parse()
            .map_err(|_| anyhow!("server.host/port do not form a socket address: {raw}"))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.connection.trim().is_empty() {
            return Err(anyhow!("store.connection is empty; set it in config.toml or STORE_CONNECTION"));
        }
        Ok(())
    }
}
