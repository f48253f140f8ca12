use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_reply::{send_reply, SharedWriter};
use crate::session::Session;
use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

use crate::core_ftpcommand::{
    cdup, cwd, help, list, noop, pass, pwd, quit, retr, stor, syst, type_, user,
};
use crate::core_network::pasv;

/// What the command loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    Close,
}

pub type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<CommandOutcome, std::io::Error>> + Send>>;

type CommandHandler = Box<
    dyn Fn(
            SharedWriter,
            Arc<Config>,
            Arc<TokioMutex<Session>>,
            String, // Trimmed argument string
        ) -> HandlerFuture
        + Send
        + Sync,
>;

pub type CommandHandlers = HashMap<FtpCommand, CommandHandler>;

pub fn initialize_command_handlers() -> CommandHandlers {
    let mut handlers: CommandHandlers = HashMap::new();

    handlers.insert(
        FtpCommand::USER,
        Box::new(|writer, config, session, arg| {
            Box::pin(user::handle_user_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::PASS,
        Box::new(|writer, config, session, arg| {
            Box::pin(pass::handle_pass_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::QUIT,
        Box::new(|writer, config, session, arg| {
            Box::pin(quit::handle_quit_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::HELP,
        Box::new(|writer, config, session, arg| {
            Box::pin(help::handle_help_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::PWD,
        Box::new(|writer, config, session, arg| {
            Box::pin(pwd::handle_pwd_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::CWD,
        Box::new(|writer, config, session, arg| {
            Box::pin(cwd::handle_cwd_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::CDUP,
        Box::new(|writer, config, session, arg| {
            Box::pin(cdup::handle_cdup_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::PASV,
        Box::new(|writer, config, session, arg| {
            Box::pin(pasv::handle_pasv_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::LIST,
        Box::new(|writer, config, session, arg| {
            Box::pin(list::handle_list_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::RETR,
        Box::new(|writer, config, session, arg| {
            Box::pin(retr::handle_retr_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::STOR,
        Box::new(|writer, config, session, arg| {
            Box::pin(stor::handle_stor_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::NOOP,
        Box::new(|writer, config, session, arg| {
            Box::pin(noop::handle_noop_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::SYST,
        Box::new(|writer, config, session, arg| {
            Box::pin(syst::handle_syst_command(writer, config, session, arg))
        }),
    );

    handlers.insert(
        FtpCommand::TYPE,
        Box::new(|writer, config, session, arg| {
            Box::pin(type_::handle_type_command(writer, config, session, arg))
        }),
    );

    handlers
}

/// Runs one parsed command: enforces the login gate, then calls its handler.
///
/// An `Err` means the control channel itself failed and the session must end.
pub async fn dispatch(
    handlers: &CommandHandlers,
    command: FtpCommand,
    writer: SharedWriter,
    config: Arc<Config>,
    session: Arc<TokioMutex<Session>>,
    arg: String,
) -> Result<CommandOutcome, std::io::Error> {
    if command.requires_auth() && !session.lock().await.is_authenticated {
        debug!("Rejected {} before login", command.as_str());
        send_reply(&writer, 530, "Not logged in.").await?;
        return Ok(CommandOutcome::Continue);
    }

    match handlers.get(&command) {
        Some(handler) => handler(writer, config, session, arg).await,
        None => {
            send_reply(&writer, 502, "Command not implemented.").await?;
            Ok(CommandOutcome::Continue)
        }
    }
}
