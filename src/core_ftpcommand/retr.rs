use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_ftpcommand::utils::{
    download_limits, ensure_data_channel, finish_transfer, open_data_connection,
    take_data_channel_or_425,
};
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::fs::File;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command.
///
/// This function sends a file from inside the root directory to the client
/// over the pending data channel. Path and open failures are answered with
/// 550 and leave the data channel pending for another attempt.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `config` - A shared server configuration (timeouts and buffer size).
/// * `session` - The session issuing the command.
/// * `arg` - The name of the file to retrieve.
///
/// # Returns
///
/// Result<CommandOutcome, std::io::Error>; `Err` only when the control channel failed.
pub async fn handle_retr_command(
    writer: SharedWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    if arg.is_empty() {
        warn!("RETR command received with no arguments");
        send_reply(&writer, 501, "Syntax error in parameters or arguments.").await?;
        return Ok(CommandOutcome::Continue);
    }

    if !ensure_data_channel(&writer, &session).await? {
        return Ok(CommandOutcome::Continue);
    }

    let resolved = {
        let session = session.lock().await;
        session.jail().resolve_file(session.current_dir(), &arg)
    };
    let file_path = match resolved {
        Ok(path) => path,
        Err(e) => {
            warn!("RETR {} refused: {}", arg, e);
            writer.lock().await.send(&e.to_ftp_response()).await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let mut file = match File::open(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            error!(
                "File not found or could not be opened: {:?}, error: {}",
                file_path, e
            );
            send_reply(&writer, 550, "File not found.").await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let Some(channel) = take_data_channel_or_425(&writer, &session).await? else {
        return Ok(CommandOutcome::Continue);
    };
    let Some(mut conn) = open_data_connection(
        &writer,
        &config,
        channel,
        "Opening data connection for file transfer.",
    )
    .await?
    else {
        return Ok(CommandOutcome::Continue);
    };

    info!("Sending file: {:?}", file_path);
    let result = conn.send_from(&mut file, download_limits(&config)).await;
    finish_transfer(&writer, &config, conn, result, "RETR").await?;

    Ok(CommandOutcome::Continue)
}
