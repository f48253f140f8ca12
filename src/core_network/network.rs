use crate::config::Config;
use crate::constants::MAX_COMMAND_LINE;
use crate::core_ftpcommand::ftpcommand::{parse_command_line, FtpCommand};
use crate::core_ftpcommand::handlers::{
    dispatch, initialize_command_handlers, CommandHandlers, CommandOutcome,
};
use crate::core_jail::PathJail;
use crate::core_reply::{send_reply, ReplyWriter, SharedWriter};
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Binds the control listener described by the configuration.
pub async fn bind_control_listener(config: &Config) -> Result<TcpListener> {
    let ip = config.server.listen_ip()?;
    let listener = TcpListener::bind((ip, config.server.listen_port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.listen_address, config.server.listen_port
            )
        })?;
    Ok(listener)
}

/// Accepts control connections forever, one task per connection.
///
/// Sessions share nothing but the configuration, the handler table and the
/// jail root; an error in one session never reaches the others.
pub async fn start_server(listener: TcpListener, config: Arc<Config>, jail: PathJail) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("Control listener has no local address")?;
    info!(
        "Server listening on {} serving {:?}",
        local_addr,
        jail.root()
    );

    let handlers = Arc::new(initialize_command_handlers());

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("New connection from {}", addr);

        let config = Arc::clone(&config);
        let handlers = Arc::clone(&handlers);
        let jail = jail.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, config, handlers, jail).await {
                warn!("Connection error for {}: {}", addr, e);
            }
            info!("Connection closed for {}", addr);
        });
    }
}

pub async fn handle_connection(
    socket: TcpStream,
    config: Arc<Config>,
    handlers: Arc<CommandHandlers>,
    jail: PathJail,
) -> Result<(), std::io::Error> {
    let peer = socket.peer_addr().ok();
    let (read_half, write_half) = socket.into_split();
    serve_session(read_half, write_half, peer, config, handlers, jail).await
}

/// Runs one session over any reader/writer pair until QUIT, EOF or an I/O error.
///
/// The pending data channel is released and the writer shut down on every
/// exit path.
pub async fn serve_session<R, W>(
    reader: R,
    writer: W,
    peer: Option<SocketAddr>,
    config: Arc<Config>,
    handlers: Arc<CommandHandlers>,
    jail: PathJail,
) -> Result<(), std::io::Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let writer = ReplyWriter::shared(writer);
    let mut session = Session::new(jail);
    session.peer_addr = peer;
    let session = Arc::new(Mutex::new(session));

    let result = command_loop(
        BufReader::new(reader),
        &writer,
        &config,
        &handlers,
        &session,
    )
    .await;

    session.lock().await.close_data_channel();
    if let Err(e) = writer.lock().await.shutdown().await {
        debug!("Error shutting down control channel for {:?}: {}", peer, e);
    }

    result
}

async fn command_loop<R>(
    mut reader: R,
    writer: &SharedWriter,
    config: &Arc<Config>,
    handlers: &CommandHandlers,
    session: &Arc<Mutex<Session>>,
) -> Result<(), std::io::Error>
where
    R: AsyncBufRead + AsyncRead + Unpin,
{
    send_reply(writer, 220, config.server.banner()).await?;

    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        let n = (&mut reader)
            .take(MAX_COMMAND_LINE as u64)
            .read_until(b'\n', &mut buffer)
            .await?;

        if n == 0 {
            info!("Client disconnected");
            break;
        }
        if n == MAX_COMMAND_LINE && !buffer.ends_with(b"\n") {
            warn!("Command line longer than {} bytes, closing", MAX_COMMAND_LINE);
            send_reply(writer, 500, "Command line too long.").await?;
            break;
        }

        let line = String::from_utf8_lossy(&buffer);
        let Some(parsed) = parse_command_line(&line) else {
            continue;
        };

        let Some(command) = FtpCommand::from_verb(parsed.verb) else {
            debug!("Unknown command: {}", parsed.verb);
            send_reply(writer, 502, "Command not implemented.").await?;
            continue;
        };

        if command == FtpCommand::PASS {
            debug!("Received command: PASS ****");
        } else {
            debug!("Received command: {} {}", command.as_str(), parsed.arg);
        }

        let outcome = dispatch(
            handlers,
            command,
            Arc::clone(writer),
            Arc::clone(config),
            Arc::clone(session),
            parsed.arg.to_string(),
        )
        .await?;

        if outcome == CommandOutcome::Close {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncWriteExt, DuplexStream, Lines};

    struct Harness {
        _tmp: TempDir,
        to_server: DuplexStream,
        from_server: Lines<BufReader<DuplexStream>>,
        task: tokio::task::JoinHandle<Result<(), std::io::Error>>,
    }

    fn start() -> Harness {
        let tmp = TempDir::new().unwrap();
        let jail = PathJail::new(tmp.path()).unwrap();
        let (to_server, server_in) = tokio::io::duplex(4096);
        let (server_out, from_server) = tokio::io::duplex(4096);

        let task = tokio::spawn(serve_session(
            server_in,
            server_out,
            None,
            Arc::new(Config::default()),
            Arc::new(initialize_command_handlers()),
            jail,
        ));

        Harness {
            _tmp: tmp,
            to_server,
            from_server: BufReader::new(from_server).lines(),
            task,
        }
    }

    impl Harness {
        async fn send(&mut self, line: &str) {
            self.to_server
                .write_all(format!("{}\r\n", line).as_bytes())
                .await
                .unwrap();
        }

        async fn reply(&mut self) -> String {
            self.from_server.next_line().await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn test_banner_then_login() {
        let mut h = start();
        assert!(h.reply().await.starts_with("220 "));

        h.send("USER alice").await;
        assert!(h.reply().await.starts_with("331 "));
        h.send("PASS whatever").await;
        assert!(h.reply().await.starts_with("230 "));
    }

    #[tokio::test]
    async fn test_blank_lines_get_no_reply_and_unknown_gets_502() {
        let mut h = start();
        h.reply().await;

        h.send("").await;
        h.send("   ").await;
        h.send("MKD x").await;
        assert!(h.reply().await.starts_with("502 "));
    }

    #[tokio::test]
    async fn test_pwd_requires_login() {
        let mut h = start();
        h.reply().await;

        h.send("PWD").await;
        assert!(h.reply().await.starts_with("530 "));
    }

    #[tokio::test]
    async fn test_help_is_multiline_and_open() {
        let mut h = start();
        h.reply().await;

        h.send("HELP").await;
        let mut lines = Vec::new();
        loop {
            let line = h.reply().await;
            let done = line.as_bytes()[3] == b' ';
            lines.push(line);
            if done {
                break;
            }
        }
        assert!(lines.len() > 1);
        assert!(lines[..lines.len() - 1].iter().all(|l| l.starts_with("214-")));
        assert!(lines.last().unwrap().starts_with("214 "));
    }

    #[tokio::test]
    async fn test_quit_replies_221_and_ends_session() {
        let mut h = start();
        h.reply().await;

        h.send("QUIT").await;
        assert!(h.reply().await.starts_with("221 "));
        assert!(h.from_server.next_line().await.unwrap().is_none());
        assert!(h.task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_client_disconnect_ends_session() {
        let mut h = start();
        h.reply().await;
        drop(h.to_server);
        assert!(h.task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_overlong_line_closes_session() {
        let mut h = start();
        h.reply().await;

        let long = "X".repeat(MAX_COMMAND_LINE + 10);
        h.to_server.write_all(long.as_bytes()).await.unwrap();
        assert!(h.reply().await.starts_with("500 "));
        assert!(h.task.await.unwrap().is_ok());
    }
}
