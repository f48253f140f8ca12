use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the TYPE FTP command.
///
/// ASCII and Image are accepted and recorded on the session. Files are
/// always streamed byte for byte, so the type has no effect on transfers.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session issuing the command.
/// * `arg` - The argument specifying the transfer type.
pub async fn handle_type_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    let primary_type = arg
        .split_whitespace()
        .next()
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();

    match primary_type.as_str() {
        "" => {
            send_reply(&writer, 501, "Syntax error in parameters or arguments.").await?;
        }
        "A" | "I" => {
            session.lock().await.type_ = primary_type.clone();
            send_reply(&writer, 200, format!("Type set to {}.", primary_type)).await?;
        }
        _ => {
            send_reply(&writer, 504, "Command not implemented for that parameter.").await?;
        }
    }

    Ok(CommandOutcome::Continue)
}
