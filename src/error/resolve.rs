use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to resolve {host}:{port}: {source}")]
    Lookup {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("No usable addresses resolved for {host}.")]
    NoAddresses { host: String },
}
