use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_noop_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    send_reply(&writer, 200, "NOOP ok.").await?;
    Ok(CommandOutcome::Continue)
}
