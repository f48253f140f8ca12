use anyhow::Result;
use clap::Parser;
use jailftpd::config::Config;
use jailftpd::constants::DEFAULT_CONFIG_PATH;
use jailftpd::core_cli::Cli;
use jailftpd::core_log::logger::init_logger;
use jailftpd::server;
use log::info;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    init_logger(args.verbose);

    // Load configuration from the TOML file, falling back to built-in defaults
    let mut config = if !args.config.is_empty() {
        Config::load_from_file(&args.config)?
    } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
        Config::load_from_file(DEFAULT_CONFIG_PATH)?
    } else {
        info!("No configuration file, using defaults");
        Config::default()
    };

    // Override settings from CLI if provided
    if let Some(root) = args.root {
        config.server.root_dir = root;
    }
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
