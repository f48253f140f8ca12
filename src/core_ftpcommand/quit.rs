use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command.
///
/// Any pending data channel is closed before the 221 goes out; the caller
/// then closes the control connection.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session being closed.
/// * `_arg` - The argument for the QUIT command (not used in this command).
pub async fn handle_quit_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    info!("Received QUIT command. Closing connection.");
    session.lock().await.close_data_channel();

    send_reply(&writer, 221, "Goodbye.").await?;
    Ok(CommandOutcome::Close)
}
