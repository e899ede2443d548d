use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Failure of a single request exchange. Absorbed by the worker loop.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Connect to {addr} timed out after {timeout:?}.")]
    ConnectTimeout { addr: SocketAddr, timeout: Duration },
    #[error("TLS handshake with {server_name} failed: {source}")]
    Handshake {
        server_name: String,
        #[source]
        source: native_tls::Error,
    },
    #[error("Write failed: {source}")]
    Write {
        #[source]
        source: std::io::Error,
    },
    #[error("Read failed: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },
    #[error("Request timed out after {timeout:?}.")]
    Timeout { timeout: Duration },
}
