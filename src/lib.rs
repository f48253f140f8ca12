//! jailftpd: a passive-mode FTP server whose sessions never leave one root directory.

pub mod config;
pub mod constants;
pub mod core_cli;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_jail;
pub mod core_log;
pub mod core_network;
pub mod core_reply;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
pub use core_jail::PathJail;
