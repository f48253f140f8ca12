use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CWD (Change Working Directory) FTP command.
///
/// The target is resolved against the current directory and must be an
/// existing directory inside the root. On any failure the current directory
/// is left untouched.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `_config` - A shared server configuration (not used in this command).
/// * `session` - The session whose current directory changes.
/// * `arg` - The target directory, relative or absolute.
pub async fn handle_cwd_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    if arg.is_empty() {
        send_reply(&writer, 501, "Missing directory.").await?;
        return Ok(CommandOutcome::Continue);
    }

    let reply = {
        let mut session = session.lock().await;
        match session.jail().resolve_dir(session.current_dir(), &arg) {
            Ok(new_dir) => {
                info!("Directory changed to: {:?}", new_dir);
                session.set_current_dir(new_dir);
                None
            }
            Err(e) => {
                warn!("CWD {} refused: {}", arg, e);
                Some(e.to_ftp_response())
            }
        }
    };

    match reply {
        None => send_reply(&writer, 250, "Directory successfully changed.").await?,
        Some(reply) => writer.lock().await.send(&reply).await?,
    }
    Ok(CommandOutcome::Continue)
}
