use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, copy, sink};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_native_tls::TlsConnector;

use crate::error::TransportError;
use crate::target::Endpoint;

/// Where one exchange dials, and the TLS server name if it is encrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub addr: SocketAddr,
    pub server_name: Option<String>,
}

impl DialTarget {
    #[must_use]
    pub fn for_endpoint(endpoint: &Endpoint, ip: IpAddr) -> Self {
        Self {
            addr: SocketAddr::new(ip, endpoint.port()),
            server_name: endpoint.is_tls().then(|| endpoint.hostname().to_owned()),
        }
    }
}

/// One connection, one request, a bounded read, then close.
///
/// Callers bound the whole exchange with their own deadline; dropping the
/// returned future closes the socket.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns how many response bytes were drained, at most `read_limit`.
    ///
    /// # Errors
    ///
    /// Returns an error when connecting, the TLS handshake, writing or reading fails.
    async fn exchange(
        &self,
        target: &DialTarget,
        request: &[u8],
        read_limit: usize,
    ) -> Result<usize, TransportError>;
}

/// TCP transport with optional TLS via the platform backend.
#[derive(Clone)]
pub struct StreamTransport {
    connect_timeout: Duration,
    tls: TlsConnector,
}

impl std::fmt::Debug for StreamTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl StreamTransport {
    #[must_use]
    pub const fn new(connect_timeout: Duration, tls: TlsConnector) -> Self {
        Self {
            connect_timeout,
            tls,
        }
    }
}

#[async_trait]
impl Transport for StreamTransport {
    async fn exchange(
        &self,
        target: &DialTarget,
        request: &[u8],
        read_limit: usize,
    ) -> Result<usize, TransportError> {
        let stream = match timeout(self.connect_timeout, TcpStream::connect(target.addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::Connect {
                    addr: target.addr,
                    source,
                });
            }
            Err(_) => {
                return Err(TransportError::ConnectTimeout {
                    addr: target.addr,
                    timeout: self.connect_timeout,
                });
            }
        };
        drop(stream.set_nodelay(true));

        match target.server_name.as_deref() {
            Some(server_name) => {
                let stream = self.tls.connect(server_name, stream).await.map_err(|source| {
                    TransportError::Handshake {
                        server_name: server_name.to_owned(),
                        source,
                    }
                })?;
                exchange_over(stream, request, read_limit).await
            }
            None => exchange_over(stream, request, read_limit).await,
        }
    }
}

async fn exchange_over<S>(
    mut stream: S,
    request: &[u8],
    read_limit: usize,
) -> Result<usize, TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream
        .write_all(request)
        .await
        .map_err(|source| TransportError::Write { source })?;
    stream
        .flush()
        .await
        .map_err(|source| TransportError::Write { source })?;

    // Drained, never buffered: memory per exchange stays constant.
    let limit = u64::try_from(read_limit).unwrap_or(u64::MAX);
    let drained = copy(&mut (&mut stream).take(limit), &mut sink())
        .await
        .map_err(|source| TransportError::Read { source })?;

    drop(stream.shutdown().await);
    Ok(usize::try_from(drained).unwrap_or(usize::MAX))
}
