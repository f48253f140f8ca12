// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/jailftpd.conf";
pub const DEFAULT_BANNER: &str = "jailftpd ready.";

pub const DEFAULT_DATA_ACCEPT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DATA_IDLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DATA_TRANSFER_TIMEOUT_SECS: u64 = 3600;

pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;

/// Used only to ask the routing table for the outward interface; nothing is sent.
pub const ROUTING_PROBE_ADDRESS: &str = "8.8.8.8:80";

/// Longest control line accepted before the session is dropped.
pub const MAX_COMMAND_LINE: usize = 4096;
