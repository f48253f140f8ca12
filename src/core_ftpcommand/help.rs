use crate::config::Config;
use crate::core_ftpcommand::handlers::CommandOutcome;
use crate::core_reply::SharedWriter;
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

const HELP_LINES: &[&str] = &[
    "Commands:",
    "USER username",
    "PASS password",
    "PASV enter_passive_mode",
    "PWD print_working_directory",
    "CWD change_working_directory",
    "CDUP change_to_parent_directory",
    "LIST list_current_directory",
    "RETR file_name_to_retrieve",
    "STOR file_name_to_upload",
    "TYPE A|I",
    "SYST",
    "NOOP",
    "QUIT",
];

pub async fn handle_help_command(
    writer: SharedWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    writer
        .lock()
        .await
        .send_multiline(214, HELP_LINES, "End of HELP.")
        .await?;
    Ok(CommandOutcome::Continue)
}
