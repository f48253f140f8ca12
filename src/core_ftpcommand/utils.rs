use crate::config::Config;
use crate::core_error::TransferError;
use crate::core_network::data_channel::{DataChannel, DataConnection, TransferLimits};
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Limits for server-to-client copies (LIST, RETR).
pub fn download_limits(config: &Config) -> TransferLimits {
    TransferLimits {
        buffer_size: config.server.download_buffer_size(),
        idle: config.server.data_idle_timeout(),
        deadline: config.server.data_transfer_timeout(),
    }
}

/// Limits for client-to-server copies (STOR).
pub fn upload_limits(config: &Config) -> TransferLimits {
    TransferLimits {
        buffer_size: config.server.upload_buffer_size(),
        idle: config.server.data_idle_timeout(),
        deadline: config.server.data_transfer_timeout(),
    }
}

/// Replies 425 and returns false when the session has no pending data channel.
pub async fn ensure_data_channel(
    writer: &SharedWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<bool, std::io::Error> {
    if session.lock().await.has_data_channel() {
        return Ok(true);
    }
    let reply = TransferError::NoDataChannel.to_ftp_response();
    writer.lock().await.send(&reply).await?;
    Ok(false)
}

/// Takes the session's pending data channel, or replies 425 when there is none.
pub async fn take_data_channel_or_425(
    writer: &SharedWriter,
    session: &Arc<Mutex<Session>>,
) -> Result<Option<DataChannel>, std::io::Error> {
    let channel = session.lock().await.take_data_channel();
    if channel.is_none() {
        let reply = TransferError::NoDataChannel.to_ftp_response();
        writer.lock().await.send(&reply).await?;
    }
    Ok(channel)
}

/// Replies 150, then waits for the client to connect to `channel`.
///
/// The 150 is on the wire before the accept starts. On accept failure or
/// timeout 425 is replied and `None` returned; the listener is gone either
/// way.
pub async fn open_data_connection(
    writer: &SharedWriter,
    config: &Config,
    channel: DataChannel,
    opening_text: &str,
) -> Result<Option<DataConnection>, std::io::Error> {
    send_reply(writer, 150, opening_text).await?;

    match channel.accept(config.server.data_accept_timeout()).await {
        Ok(conn) => Ok(Some(conn)),
        Err(e) => {
            warn!("Data connection not established: {}", e);
            writer.lock().await.send(&e.to_ftp_response()).await?;
            Ok(None)
        }
    }
}

/// Closes the data connection, then reports the outcome on the control channel.
pub async fn finish_transfer(
    writer: &SharedWriter,
    config: &Config,
    conn: DataConnection,
    result: Result<u64, TransferError>,
    what: &str,
) -> Result<(), std::io::Error> {
    let peer = conn.peer();
    conn.close(config.server.data_idle_timeout()).await;

    match result {
        Ok(bytes) => {
            info!("{} to/from {} complete: {} bytes", what, peer, bytes);
            send_reply(writer, 226, "Transfer complete.").await
        }
        Err(e) => {
            warn!("{} to/from {} aborted: {}", what, peer, e);
            writer.lock().await.send(&e.to_ftp_response()).await
        }
    }
}
