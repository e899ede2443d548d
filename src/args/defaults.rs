use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!(
    "sustain-loadtest/",
    env!("CARGO_PKG_VERSION"),
    " (+https://crates.io/crates/sustain)"
);

/// Bytes of each response that are read before the connection is closed.
pub(crate) const DEFAULT_READ_LIMIT: usize = 1024;
pub(crate) const MAX_READ_LIMIT: usize = 16_777_216;

/// Ceiling for every duration flag (one year).
pub(crate) const MAX_DURATION: Duration = Duration::from_secs(31_536_000);
