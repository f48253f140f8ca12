use log::{error, trace};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// One line of a control-channel reply.
///
/// A reply with `continued == true` is rendered as `code-text` and tells the
/// client more lines follow; the final line of a logical reply is rendered
/// as `code text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
    pub continued: bool,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            continued: false,
        }
    }

    pub fn continuation(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            continued: true,
        }
    }

    /// Wire form of this line, CRLF included.
    pub fn to_line(&self) -> String {
        format!("{}\r\n", self)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.continued { '-' } else { ' ' };
        write!(f, "{:03}{}{}", self.code, separator, self.text)
    }
}

/// Writes replies onto the control channel.
///
/// Every call flushes, so a reply is on the wire before the caller moves on
/// to the next step (for instance blocking on a data-channel accept after
/// `150`).
pub struct ReplyWriter {
    inner: Box<dyn AsyncWrite + Send + Unpin>,
}

/// The control-channel writer as handlers receive it.
pub type SharedWriter = Arc<Mutex<ReplyWriter>>;

impl ReplyWriter {
    pub fn new<W>(inner: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn shared<W>(inner: W) -> SharedWriter
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Arc::new(Mutex::new(Self::new(inner)))
    }

    pub async fn send(&mut self, reply: &Reply) -> Result<(), std::io::Error> {
        trace!("-> {}", reply);
        if let Err(e) = self.inner.write_all(reply.to_line().as_bytes()).await {
            error!("Failed to send reply {}: {}", reply.code, e);
            return Err(e);
        }
        self.inner.flush().await
    }

    /// Sends `lines` as continuation lines followed by the terminating line.
    pub async fn send_multiline(
        &mut self,
        code: u16,
        lines: &[&str],
        last: &str,
    ) -> Result<(), std::io::Error> {
        let mut payload = String::new();
        for line in lines {
            payload.push_str(&Reply::continuation(code, *line).to_line());
        }
        payload.push_str(&Reply::new(code, last).to_line());

        self.inner.write_all(payload.as_bytes()).await?;
        self.inner.flush().await
    }

    pub async fn shutdown(&mut self) -> Result<(), std::io::Error> {
        self.inner.shutdown().await
    }
}

/// Sends a single-line reply through a shared writer.
pub async fn send_reply(
    writer: &SharedWriter,
    code: u16,
    text: impl Into<String>,
) -> Result<(), std::io::Error> {
    let reply = Reply::new(code, text);
    writer.lock().await.send(&reply).await
}
