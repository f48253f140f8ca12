use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::helpers::strip_control_chars;
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// Any username is accepted and the client is asked for a password. The
/// name, stripped of control characters, is only kept for logging.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session issuing the command.
/// * `username` - The username provided by the client.
///
/// # Returns
///
/// Result<CommandOutcome, std::io::Error>; `Err` only when the reply could not be sent.
pub async fn handle_user_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> Result<CommandOutcome, std::io::Error> {
    let username = strip_control_chars(&username);
    info!("Received USER command with username: {}", username);

    {
        let mut session = session.lock().await;
        session.username = Some(username.clone());
    }

    send_reply(&writer, 331, format!("User {} okay, need password.", username)).await?;
    Ok(CommandOutcome::Continue)
}
