use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command.
///
/// Every password is accepted: the session becomes authenticated
/// unconditionally. There is no credential store behind this server.
pub async fn handle_pass_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _password: String,
) -> Result<CommandOutcome, std::io::Error> {
    {
        let mut session = session.lock().await;
        session.is_authenticated = true;
        info!(
            "User {} logged in from {:?}",
            session.username.as_deref().unwrap_or("<none>"),
            session.peer_addr
        );
    }

    send_reply(&writer, 230, "User logged in, proceed.").await?;
    Ok(CommandOutcome::Continue)
}
