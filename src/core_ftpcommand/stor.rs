use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_ftpcommand::utils::{
    ensure_data_channel, finish_transfer, open_data_connection, take_data_channel_or_425,
    upload_limits,
};
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::fs::File;
use tokio::sync::Mutex;

/// Handles the STOR (Store File) FTP command.
///
/// This function stores a file uploaded by the client inside the current
/// directory, truncating any existing file of that name. No file is
/// created unless a data channel is pending. Two sessions storing the same
/// path are not serialized: the last writer wins.
///
/// # Arguments
///
/// * `writer` - The control-channel reply writer.
/// * `config` - A shared server configuration (timeouts and buffer size).
/// * `session` - The session issuing the command.
/// * `arg` - The name of the file to be stored.
///
/// # Returns
///
/// Result<CommandOutcome, std::io::Error>; `Err` only when the control channel failed.
pub async fn handle_stor_command(
    writer: SharedWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    if arg.is_empty() {
        warn!("STOR command received with no arguments");
        send_reply(&writer, 501, "Syntax error in parameters or arguments.").await?;
        return Ok(CommandOutcome::Continue);
    }

    if !ensure_data_channel(&writer, &session).await? {
        return Ok(CommandOutcome::Continue);
    }

    let resolved = {
        let session = session.lock().await;
        session.jail().resolve_within(session.current_dir(), &arg)
    };
    let file_path = match resolved {
        Ok(path) => path,
        Err(e) => {
            warn!("STOR {} refused: {}", arg, e);
            writer.lock().await.send(&e.to_ftp_response()).await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let mut file = match File::create(&file_path).await {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to create file: {:?}, error: {}", file_path, e);
            send_reply(&writer, 550, "Cannot create file.").await?;
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
        "Opening data connection for file upload.",
    )
    .await?
    else {
        return Ok(CommandOutcome::Continue);
    };

    info!("Receiving file: {:?}", file_path);
    let result = conn.receive_into(&mut file, upload_limits(&config)).await;
    drop(file);
    finish_transfer(&writer, &config, conn, result, "STOR").await?;

    Ok(CommandOutcome::Continue)
}
