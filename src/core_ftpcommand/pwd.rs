// src/core_ftpcommand/pwd.rs
use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    let current_dir = session.lock().await.current_dir().to_path_buf();
    send_reply(&writer, 257, quote_path(&current_dir)).await?;
    Ok(CommandOutcome::Continue)
}

/// Renders a directory for a 257 reply: wrapped in quotes, inner quotes doubled.
pub fn quote_path(path: &Path) -> String {
    let display = path.to_string_lossy();

    // On Windows systems, the path will be formatted with Windows style separators ('\')
    // Most FTP clients expect normal UNIX separators ('/'), so we replace the separators here.
    #[cfg(windows)]
    let display = display.replace(std::path::MAIN_SEPARATOR, "/");

    format!("\"{}\"", display.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_path() {
        assert_eq!(quote_path(Path::new("/srv")), "\"/srv\"");
        assert_eq!(quote_path(Path::new("/srv/say \"hi\"")), "\"/srv/say \"\"hi\"\"\"");
    }
}
