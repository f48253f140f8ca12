use crate::config::{Config, ServerConfig};
use crate::constants::ROUTING_PROBE_ADDRESS;
use crate::core_error::TransferError;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_network::data_channel::DataChannel;
use crate::core_reply::{Reply, SharedWriter};
use crate::session::Session;
use log::{debug, error, info};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Sets up a passive mode (PASV) listener and sends the response to the client.
///
/// A listener left over from an earlier PASV is closed first, so the session
/// never holds more than one. If binding fails the session ends up with no
/// pending channel and 425 is replied.
pub async fn handle_pasv_command(
    writer: SharedWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    session.lock().await.close_data_channel();

    let bind_ip = match config.server.listen_ip() {
        Ok(ip) => ip,
        Err(e) => {
            error!("Cannot bind passive listener: {:#}", e);
            let reply = TransferError::Bind(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ))
            .to_ftp_response();
            writer.lock().await.send(&reply).await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let channel = match DataChannel::bind(bind_ip).await {
        Ok(channel) => channel,
        Err(e) => {
            error!("Failed to set up passive listener: {}", e);
            writer.lock().await.send(&e.to_ftp_response()).await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    // Only the client on the control connection may use the data port.
    let channel = match session.lock().await.peer_addr {
        Some(peer) => channel.restrict_to(peer.ip()),
        None => channel,
    };

    let advertised = advertised_ipv4(&config.server);
    let reply = pasv_reply(advertised, channel.port());
    info!(
        "PASV listener on {} advertised as {}:{}",
        channel.local_addr(),
        advertised,
        channel.port()
    );

    session.lock().await.replace_data_channel(channel);
    writer.lock().await.send(&reply).await?;
    Ok(CommandOutcome::Continue)
}

/// Builds `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)`.
pub fn pasv_reply(ip: Ipv4Addr, port: u16) -> Reply {
    let [h1, h2, h3, h4] = ip.octets();
    Reply::new(
        227,
        format!(
            "Entering Passive Mode ({},{},{},{},{},{})",
            h1,
            h2,
            h3,
            h4,
            port / 256,
            port % 256
        ),
    )
}

/// The IPv4 address clients are told to connect to.
///
/// In order: the configured `pasv_address`, the listen address when it names
/// one specific IPv4 interface, the outward interface reported by the
/// routing table, and finally 127.0.0.1.
pub fn advertised_ipv4(server: &ServerConfig) -> Ipv4Addr {
    if let Some(IpAddr::V4(ip)) = server.pasv_ip() {
        return ip;
    }

    if let Ok(IpAddr::V4(ip)) = server.listen_ip() {
        if !ip.is_unspecified() {
            return ip;
        }
    }

    detect_outward_ipv4().unwrap_or(Ipv4Addr::LOCALHOST)
}

/// First non-loopback IPv4 address, as chosen by the OS routing table.
///
/// Connecting a UDP socket only performs a route lookup; no packet is sent.
pub fn detect_outward_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    if let Err(e) = socket.connect(ROUTING_PROBE_ADDRESS) {
        debug!("No route for outward address detection: {}", e);
        return None;
    }

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pasv_reply_splits_port_big_endian() {
        let reply = pasv_reply(Ipv4Addr::new(192, 168, 1, 20), 50_000);
        assert_eq!(
            reply.to_line(),
            "227 Entering Passive Mode (192,168,1,20,195,80)\r\n"
        );
        assert_eq!(195 * 256 + 80, 50_000);
    }

    #[test]
    fn test_pasv_reply_small_port() {
        let reply = pasv_reply(Ipv4Addr::LOCALHOST, 255);
        assert_eq!(reply.text, "Entering Passive Mode (127,0,0,1,0,255)");
    }

    #[test]
    fn test_configured_address_wins() {
        let mut server = ServerConfig::default();
        server.pasv_address = Some("203.0.113.7".to_string());
        assert_eq!(advertised_ipv4(&server), Ipv4Addr::new(203, 0, 113, 7));
    }

    #[test]
    fn test_specific_listen_address_is_advertised() {
        let mut server = ServerConfig::default();
        server.listen_address = "127.0.0.1".to_string();
        assert_eq!(advertised_ipv4(&server), Ipv4Addr::LOCALHOST);
    }

    #[test]
    fn test_detected_address_is_never_loopback() {
        if let Some(ip) = detect_outward_ipv4() {
            assert!(!ip.is_loopback());
        }
    }
}
