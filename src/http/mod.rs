//! Request synthesis and the stream transport used by workers.
mod request;
mod tls;
mod transport;

#[cfg(test)]
mod tests;

pub use request::{PlainSynthesizer, RequestSynthesizer};
pub use tls::build_tls_connector;
pub use transport::{DialTarget, StreamTransport, Transport};
