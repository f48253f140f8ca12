use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_ftpcommand::utils::{
    download_limits, ensure_data_channel, finish_transfer, open_data_connection,
    take_data_channel_or_425,
};
use crate::core_reply::{send_reply, SharedWriter};
use crate::helpers::format_list_entry;
use crate::session::Session;
use log::{error, info, warn};
use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the LIST FTP command.
///
/// Lists the current directory over the pending data channel, one line per
/// entry. The argument is ignored. When the directory cannot be read, 550
/// is replied before 150 and the data channel stays pending.
pub async fn handle_list_command(
    writer: SharedWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    if !ensure_data_channel(&writer, &session).await? {
        return Ok(CommandOutcome::Continue);
    }

    let current_dir = session.lock().await.current_dir().to_path_buf();
    let listing = match build_listing(&current_dir).await {
        Ok(listing) => listing,
        Err(e) => {
            error!("Error reading directory {:?}: {}", current_dir, e);
            send_reply(&writer, 550, "Failed to list directory.").await?;
            return Ok(CommandOutcome::Continue);
        }
    };

    let Some(channel) = take_data_channel_or_425(&writer, &session).await? else {
        return Ok(CommandOutcome::Continue);
    };
    let Some(mut conn) =
        open_data_connection(&writer, &config, channel, "Here comes the directory listing.")
            .await?
    else {
        return Ok(CommandOutcome::Continue);
    };

    info!("Listing {:?} to {}", current_dir, conn.peer());
    let result = conn.send_from(&mut listing.as_bytes(), download_limits(&config)).await;
    finish_transfer(&writer, &config, conn, result, "LIST").await?;

    Ok(CommandOutcome::Continue)
}

/// Renders every readable entry of `dir`, sorted by name.
pub async fn build_listing(dir: &Path) -> Result<String, std::io::Error> {
    let mut entries = fs::read_dir(dir).await?;
    let mut rows = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let metadata = entry.metadata().await;
        rows.push((name, metadata));
    }

    Ok(render_listing(rows))
}

/// Sorts `rows` by name and renders one line per entry.
///
/// Entries whose metadata could not be read are left out; the rest are still listed.
pub fn render_listing(rows: Vec<(String, Result<Metadata, std::io::Error>)>) -> String {
    let mut readable: Vec<(String, Metadata)> = rows
        .into_iter()
        .filter_map(|(name, metadata)| match metadata {
            Ok(metadata) => Some((name, metadata)),
            Err(e) => {
                warn!("Failed to get metadata for entry: {:?}, error: {:?}", name, e);
                None
            }
        })
        .collect();

    readable.sort_by(|a, b| a.0.cmp(&b.0));

    let mut listing = String::new();
    for (name, metadata) in &readable {
        listing.push_str(&format_list_entry(name, metadata));
    }
    listing
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_listing_is_sorted_and_typed() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("b.txt"), b"12345").unwrap();
        std::fs::create_dir(tmp.path().join("a_dir")).unwrap();

        let listing = build_listing(tmp.path()).await.unwrap();
        let lines: Vec<&str> = listing.split("\r\n").filter(|l| !l.is_empty()).collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Folder "));
        assert!(lines[0].ends_with(" a_dir"));
        assert!(lines[1].starts_with("File 5 "));
        assert!(lines[1].ends_with(" b.txt"));
    }

    #[test]
    fn test_unreadable_entry_is_omitted() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("kept.txt"), b"ok").unwrap();
        let kept = std::fs::metadata(tmp.path().join("kept.txt")).unwrap();

        let listing = render_listing(vec![
            (
                "vanished".to_string(),
                Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
            ),
            ("kept.txt".to_string(), Ok(kept)),
        ]);

        let lines: Vec<&str> = listing.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("File 2 "));
        assert!(lines[0].ends_with(" kept.txt"));
    }

    #[tokio::test]
    async fn test_listing_of_empty_directory() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(build_listing(tmp.path()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_listing_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(build_listing(&tmp.path().join("gone")).await.is_err());
    }
}
