use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "jailftpd", about = "A passive-mode FTP server confined to one directory.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Root directory to serve, overrides the configuration file
    #[arg(short, long)]
    pub root: Option<String>,

    /// Control port, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_are_parsed() {
        let cli = Cli::parse_from(["jailftpd", "--root", "/srv", "-p", "2121", "-v"]);
        assert_eq!(cli.root.as_deref(), Some("/srv"));
        assert_eq!(cli.port, Some(2121));
        assert!(cli.verbose);
        assert!(cli.config.is_empty());
    }
}
