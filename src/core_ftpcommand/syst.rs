use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the SYST (System) FTP command.
///
/// Always reports a UNIX system with 8-bit bytes, which is what most
/// clients expect for binary transfers.
pub async fn handle_syst_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    info!("Responding to SYST command with system type.");
    send_reply(&writer, 215, "UNIX Type: L8").await?;
    Ok(CommandOutcome::Continue)
}
