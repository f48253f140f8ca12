use crate::core_jail::PathJail;
use crate::core_network::data_channel::DataChannel;
use log::debug;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Per-connection state of one control channel.
///
/// Owned by the connection task alone; nothing here is shared with other
/// sessions.
#[derive(Debug)]
pub struct Session {
    pub is_authenticated: bool,   // Set by PASS, never reset
    pub username: Option<String>, // Username for the session
    pub type_: String,            // The transfer type requested by TYPE (A or I)
    pub peer_addr: Option<SocketAddr>,
    jail: PathJail,
    current_dir: PathBuf,
    data_channel: Option<DataChannel>,
}

impl Session {
    pub fn new(jail: PathJail) -> Self {
        let current_dir = jail.root().to_path_buf();
        Self {
            is_authenticated: false,
            username: None,
            type_: "A".to_string(), // Default transfer type is ASCII
            peer_addr: None,
            jail,
            current_dir,
            data_channel: None,
        }
    }

    pub fn jail(&self) -> &PathJail {
        &self.jail
    }

    pub fn root_dir(&self) -> &Path {
        self.jail.root()
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Moves the session to `dir`, which must already have been validated by the jail.
    pub fn set_current_dir(&mut self, dir: PathBuf) {
        debug_assert!(crate::core_jail::contains(self.jail.root(), &dir));
        self.current_dir = dir;
    }

    pub fn has_data_channel(&self) -> bool {
        self.data_channel.is_some()
    }

    /// Installs a freshly bound channel, closing any one still listening.
    pub fn replace_data_channel(&mut self, channel: DataChannel) {
        if let Some(stale) = self.data_channel.replace(channel) {
            debug!(
                "Closing stale passive listener on {} for {:?}",
                stale.local_addr(),
                self.peer_addr
            );
        }
    }

    /// Hands the pending channel to a transfer; the session no longer holds it.
    pub fn take_data_channel(&mut self) -> Option<DataChannel> {
        self.data_channel.take()
    }

    pub fn close_data_channel(&mut self) {
        if let Some(channel) = self.data_channel.take() {
            debug!(
                "Closing passive listener on {} for {:?}",
                channel.local_addr(),
                self.peer_addr
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tempfile::TempDir;

    #[test]
    fn test_new_session_starts_at_root_unauthenticated() {
        let tmp = TempDir::new().unwrap();
        let session = Session::new(PathJail::new(tmp.path()).unwrap());
        assert!(!session.is_authenticated);
        assert_eq!(session.current_dir(), session.root_dir());
        assert!(!session.has_data_channel());
    }

    #[tokio::test]
    async fn test_replacing_data_channel_closes_the_old_listener() {
        let tmp = TempDir::new().unwrap();
        let mut session = Session::new(PathJail::new(tmp.path()).unwrap());
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);

        let first = DataChannel::bind(ip).await.unwrap();
        let first_addr = first.local_addr();
        session.replace_data_channel(first);

        let second = DataChannel::bind(ip).await.unwrap();
        let second_addr = second.local_addr();
        session.replace_data_channel(second);

        assert!(tokio::net::TcpStream::connect(first_addr).await.is_err());
        assert_eq!(session.take_data_channel().unwrap().local_addr(), second_addr);
        assert!(!session.has_data_channel());
    }
}
