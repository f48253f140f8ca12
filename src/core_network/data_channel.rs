use crate::core_error::TransferError;
use log::{debug, info, warn};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// A passive-mode listener waiting for its single data connection.
///
/// Holding a `DataChannel` means the channel is still listening. Accepting
/// consumes it and closes the listener, so one PASV serves exactly one
/// transfer.
#[derive(Debug)]
pub struct DataChannel {
    listener: TcpListener,
    local_addr: SocketAddr,
    allowed_peer: Option<IpAddr>,
}

impl DataChannel {
    /// Binds a listener on an ephemeral port of `ip`.
    pub async fn bind(ip: IpAddr) -> Result<Self, TransferError> {
        let listener = TcpListener::bind((ip, 0))
            .await
            .map_err(TransferError::Bind)?;
        let local_addr = listener.local_addr().map_err(TransferError::Bind)?;
        debug!("Passive listener bound on {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
            allowed_peer: None,
        })
    }

    /// Only accept data connections coming from `peer`.
    pub fn restrict_to(mut self, peer: IpAddr) -> Self {
        self.allowed_peer = Some(peer.to_canonical());
        self
    }

    pub fn allowed_peer(&self) -> Option<IpAddr> {
        self.allowed_peer
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Waits up to `deadline` for the client to connect.
    ///
    /// Connections from any address other than the allowed peer are dropped
    /// and the wait goes on. The listener is closed when this returns,
    /// whatever the outcome.
    pub async fn accept(self, deadline: Duration) -> Result<DataConnection, TransferError> {
        let result = match timeout(deadline, self.accept_allowed()).await {
            Ok(Ok(conn)) => {
                info!("Data connection from {} on {}", conn.peer, self.local_addr);
                Ok(conn)
            }
            Ok(Err(e)) => Err(TransferError::Accept(e)),
            Err(_) => {
                warn!(
                    "No data connection on {} within {:?}",
                    self.local_addr, deadline
                );
                Err(TransferError::AcceptTimedOut(deadline))
            }
        };
        debug!("Passive listener on {} closed", self.local_addr);
        result
    }

    async fn accept_allowed(&self) -> Result<DataConnection, std::io::Error> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            match self.allowed_peer {
                Some(allowed) if peer.ip().to_canonical() != allowed => {
                    warn!(
                        "Rejected data connection from {} on {}, expected {}",
                        peer, self.local_addr, allowed
                    );
                    drop(stream);
                }
                _ => return Ok(DataConnection { stream, peer }),
            }
        }
    }
}

/// The accepted side of a data channel, used for one transfer and then closed.
#[derive(Debug)]
pub struct DataConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl DataConnection {
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Streams `source` to the client.
    pub async fn send_from<R>(
        &mut self,
        source: &mut R,
        limits: TransferLimits,
    ) -> Result<u64, TransferError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let copy = copy_with_idle_timeout(source, &mut self.stream, limits.buffer_size, limits.idle);
        within_deadline(limits.deadline, copy).await
    }

    /// Streams everything the client sends into `sink`, until it closes its side.
    pub async fn receive_into<W>(
        &mut self,
        sink: &mut W,
        limits: TransferLimits,
    ) -> Result<u64, TransferError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let copy = async {
            let received =
                copy_with_idle_timeout(&mut self.stream, sink, limits.buffer_size, limits.idle)
                    .await?;
            match timeout(limits.idle, sink.flush()).await {
                Ok(Ok(())) => Ok(received),
                Ok(Err(e)) => Err(TransferError::Copy(e)),
                Err(_) => Err(TransferError::Stalled(limits.idle)),
            }
        };
        within_deadline(limits.deadline, copy).await
    }

    /// Flushes and shuts the connection down so the client sees EOF.
    pub async fn close(mut self, idle: Duration) {
        match timeout(idle, self.stream.shutdown()).await {
            Ok(Ok(())) => debug!("Data connection to {} closed", self.peer),
            Ok(Err(e)) => debug!("Error closing data connection to {}: {}", self.peer, e),
            Err(_) => warn!("Timed out closing data connection to {}", self.peer),
        }
    }
}

/// Bounds on one bulk copy over a data connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLimits {
    pub buffer_size: usize,
    /// Longest wait for any single read or write.
    pub idle: Duration,
    /// Longest the whole copy may take, however steadily bytes arrive.
    pub deadline: Duration,
}

async fn within_deadline<F>(deadline: Duration, copy: F) -> Result<u64, TransferError>
where
    F: std::future::Future<Output = Result<u64, TransferError>>,
{
    match timeout(deadline, copy).await {
        Ok(result) => result,
        Err(_) => Err(TransferError::DeadlineExceeded(deadline)),
    }
}

/// Copies `reader` into `writer` chunk by chunk.
///
/// Each read and each write must complete within `idle`, so a peer that
/// stops reading or sending cannot pin the session.
pub async fn copy_with_idle_timeout<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
    idle: Duration,
) -> Result<u64, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0; buffer_size.max(1)];
    let mut total = 0u64;

    loop {
        let bytes_read = match timeout(idle, reader.read(&mut buffer)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(TransferError::Copy(e)),
            Err(_) => return Err(TransferError::Stalled(idle)),
        };

        match timeout(idle, writer.write_all(&buffer[..bytes_read])).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(TransferError::Copy(e)),
            Err(_) => return Err(TransferError::Stalled(idle)),
        }

        total += bytes_read as u64;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_accept_yields_one_connection_and_closes_listener() {
        let channel = DataChannel::bind(LOCALHOST).await.unwrap();
        let addr = channel.local_addr();

        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let conn = channel.accept(Duration::from_secs(5)).await.unwrap();
        let _client = client.await.unwrap();
        conn.close(Duration::from_secs(1)).await;

        // The listener went away with the channel.
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_accept_times_out() {
        let channel = DataChannel::bind(LOCALHOST).await.unwrap();
        let err = channel
            .accept(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::AcceptTimedOut(_)));
    }

    #[tokio::test]
    async fn test_restricted_channel_drops_other_peers() {
        let channel = DataChannel::bind(LOCALHOST)
            .await
            .unwrap()
            .restrict_to(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2)));
        let addr = channel.local_addr();

        let intruder = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let mut received = Vec::new();
            let _ = stream.read_to_end(&mut received).await;
            received
        });

        let err = channel
            .accept(Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::AcceptTimedOut(_)));
        assert!(intruder.await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_restricted_channel_accepts_its_peer() {
        let channel = DataChannel::bind(LOCALHOST).await.unwrap().restrict_to(LOCALHOST);
        assert_eq!(channel.allowed_peer(), Some(LOCALHOST));
        let addr = channel.local_addr();

        let client = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
        let conn = channel.accept(Duration::from_secs(5)).await.unwrap();
        assert_eq!(conn.peer().ip(), LOCALHOST);
        drop(client.await.unwrap());
    }

    #[tokio::test]
    async fn test_trickling_peer_hits_transfer_deadline() {
        let channel = DataChannel::bind(LOCALHOST).await.unwrap();
        let addr = channel.local_addr();

        // One byte every 50ms never trips the idle timeout.
        let trickle = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            for _ in 0..100 {
                if stream.write_all(b"x").await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        let mut conn = channel.accept(Duration::from_secs(5)).await.unwrap();
        let limits = TransferLimits {
            buffer_size: 16,
            idle: Duration::from_secs(1),
            deadline: Duration::from_millis(400),
        };
        let mut sink = Vec::new();
        let err = conn.receive_into(&mut sink, limits).await.unwrap_err();
        assert!(matches!(err, TransferError::DeadlineExceeded(_)));
        assert!(!sink.is_empty());

        conn.close(Duration::from_secs(1)).await;
        trickle.abort();
    }

    #[tokio::test]
    async fn test_copy_moves_all_bytes() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader = &data[..];
        let mut out = Vec::new();
        let copied = copy_with_idle_timeout(&mut reader, &mut out, 333, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn test_copy_stalls_on_silent_peer() {
        // The write half is kept alive but never written to.
        let (mut silent, _keep_open) = tokio::io::duplex(64);
        let mut out = Vec::new();
        let err = copy_with_idle_timeout(&mut silent, &mut out, 64, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Stalled(_)));
    }
}
