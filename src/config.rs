use crate::constants::{
    DEFAULT_BANNER, DEFAULT_DATA_ACCEPT_TIMEOUT_SECS, DEFAULT_DATA_IDLE_TIMEOUT_SECS,
    DEFAULT_DATA_TRANSFER_TIMEOUT_SECS, DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_UPLOAD_BUFFER_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub root_dir: String,
    /// Address advertised in PASV replies; detected when unset or empty.
    pub pasv_address: Option<String>,
    pub banner: Option<String>,
    pub data_accept_timeout_secs: Option<u64>,
    pub data_idle_timeout_secs: Option<u64>,
    /// Upper bound on one whole RETR, STOR or LIST copy.
    pub data_transfer_timeout_secs: Option<u64>,
    pub upload_buffer_size: Option<usize>, // Optional to allow default value
    pub download_buffer_size: Option<usize>, // Optional to allow default value
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 2121,
            root_dir: String::from("/srv/ftp"),
            pasv_address: None,
            banner: Some(DEFAULT_BANNER.to_string()),
            data_accept_timeout_secs: Some(DEFAULT_DATA_ACCEPT_TIMEOUT_SECS),
            data_idle_timeout_secs: Some(DEFAULT_DATA_IDLE_TIMEOUT_SECS),
            data_transfer_timeout_secs: Some(DEFAULT_DATA_TRANSFER_TIMEOUT_SECS),
            upload_buffer_size: Some(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
        }
    }
}

impl ServerConfig {
    pub fn listen_ip(&self) -> Result<IpAddr> {
        self.listen_address
            .parse()
            .with_context(|| format!("Invalid listen address: {}", self.listen_address))
    }

    /// The configured PASV address, if one is set and parses as an IP.
    pub fn pasv_ip(&self) -> Option<IpAddr> {
        self.pasv_address
            .as_deref()
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .and_then(|addr| addr.parse().ok())
    }

    pub fn banner(&self) -> &str {
        self.banner.as_deref().unwrap_or(DEFAULT_BANNER)
    }

    pub fn data_accept_timeout(&self) -> Duration {
        Duration::from_secs(
            self.data_accept_timeout_secs
                .unwrap_or(DEFAULT_DATA_ACCEPT_TIMEOUT_SECS),
        )
    }

    pub fn data_idle_timeout(&self) -> Duration {
        Duration::from_secs(
            self.data_idle_timeout_secs
                .unwrap_or(DEFAULT_DATA_IDLE_TIMEOUT_SECS),
        )
    }

    pub fn data_transfer_timeout(&self) -> Duration {
        Duration::from_secs(
            self.data_transfer_timeout_secs
                .unwrap_or(DEFAULT_DATA_TRANSFER_TIMEOUT_SECS),
        )
    }

    pub fn upload_buffer_size(&self) -> usize {
        self.upload_buffer_size
            .unwrap_or(DEFAULT_UPLOAD_BUFFER_SIZE)
            .max(1)
    }

    pub fn download_buffer_size(&self) -> usize {
        self.download_buffer_size
            .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE)
            .max(1)
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;

        // Set defaults if not specified
        if config.server.banner.is_none() {
            config.server.banner = Some(DEFAULT_BANNER.to_string());
        }
        if config.server.data_accept_timeout_secs.is_none() {
            config.server.data_accept_timeout_secs = Some(DEFAULT_DATA_ACCEPT_TIMEOUT_SECS);
        }
        if config.server.data_idle_timeout_secs.is_none() {
            config.server.data_idle_timeout_secs = Some(DEFAULT_DATA_IDLE_TIMEOUT_SECS);
        }
        if config.server.data_transfer_timeout_secs.is_none() {
            config.server.data_transfer_timeout_secs = Some(DEFAULT_DATA_TRANSFER_TIMEOUT_SECS);
        }
        if config.server.upload_buffer_size.is_none() {
            config.server.upload_buffer_size = Some(DEFAULT_UPLOAD_BUFFER_SIZE);
        }
        if config.server.download_buffer_size.is_none() {
            config.server.download_buffer_size = Some(DEFAULT_DOWNLOAD_BUFFER_SIZE);
        }

        Ok(config)
    }
}
