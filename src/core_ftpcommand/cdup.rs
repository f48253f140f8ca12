use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_cdup_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    let reply = {
        let mut session = session.lock().await;
        match session.jail().parent_of(session.current_dir()) {
            Ok(parent) => {
                info!("Directory successfully changed to: {:?}", parent);
                session.set_current_dir(parent);
                None
            }
            Err(e) => {
                warn!("CDUP refused: {}", e);
                Some(e.to_ftp_response())
            }
        }
    };

    match reply {
        None => send_reply(&writer, 200, "Command okay.").await?,
        Some(reply) => writer.lock().await.send(&reply).await?,
    }
    Ok(CommandOutcome::Continue)
}
