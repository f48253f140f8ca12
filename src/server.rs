use crate::config::Config;
use crate::core_jail::PathJail;
use crate::core_network::network;
use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration.
///
/// This function validates the root directory, binds the control listener
/// and serves connections until the process is stopped, logging significant
/// steps and potential issues.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of startup.
pub async fn run(config: Config) -> Result<()> {
    log_config(&config);

    let jail = PathJail::new(&config.server.root_dir)
        .with_context(|| format!("Invalid root directory: {}", config.server.root_dir))?;
    let listener = network::bind_control_listener(&config).await?;

    if let Err(e) = network::start_server(listener, Arc::new(config), jail).await {
        error!("Server stopped: {:#}", e);
        return Err(e);
    }

    Ok(())
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Root Directory: {}", config.server.root_dir);
    info!(
        "  PASV Address: {}",
        config.server.pasv_address.as_deref().unwrap_or("<detected>")
    );
    info!(
        "  Data Accept Timeout: {:?}",
        config.server.data_accept_timeout()
    );
    info!("  Data Idle Timeout: {:?}", config.server.data_idle_timeout());
    info!(
        "  Data Transfer Timeout: {:?}",
        config.server.data_transfer_timeout()
    );
    info!(
        "  Upload Buffer Size: {} KB",
        config.server.upload_buffer_size() / 1024
    );
    info!(
        "  Download Buffer Size: {} KB",
        config.server.download_buffer_size() / 1024
    );
}
