use chrono::{DateTime, Local};
use std::fs::Metadata;

/// One LIST line: `<type> <size> <mtime> <name>\r\n`.
///
/// The modification time is a single token (`%Y-%m-%dT%H:%M:%S`, local
/// time) so the name is always everything after the third space.
pub fn format_list_entry(name: &str, metadata: &Metadata) -> String {
    let file_type = if metadata.is_dir() { "Folder" } else { "File" };
    let modified = metadata
        .modified()
        .map(|time| DateTime::<Local>::from(time).format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|_| "-".to_string());

    format!("{} {} {} {}\r\n", file_type, metadata.len(), modified, name)
}

/// Drops control characters so client-supplied text cannot break a reply line.
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}
