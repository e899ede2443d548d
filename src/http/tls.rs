use tokio_native_tls::TlsConnector;

use crate::error::AppResult;

/// Builds the connector shared by every worker.
///
/// With `insecure` set, certificate chains and hostnames are not verified.
///
/// # Errors
///
/// Returns an error when the platform TLS backend cannot be initialised.
pub fn build_tls_connector(insecure: bool) -> AppResult<TlsConnector> {
    let mut builder = native_tls::TlsConnector::builder();
    if insecure {
        builder
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true);
    }
    let connector = builder.build()?;
    Ok(TlsConnector::from(connector))
}
