use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ResolveError;

use super::addresses::{AddressSet, AddressState};
use super::endpoint::Endpoint;

/// Change notifications carry no payload: "the address set changed".
pub type ChangeSender = mpsc::Sender<()>;
pub type ChangeReceiver = mpsc::Receiver<()>;

/// Capacity 1 so any burst of changes collapses into one pending notice.
const CHANGE_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn change_channel() -> (ChangeSender, ChangeReceiver) {
    mpsc::channel(CHANGE_CHANNEL_CAPACITY)
}

/// Hostname lookup used for the startup resolution and every refresh.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the lookup fails or yields no usable address.
    async fn resolve(&self, host: &str, port: u16) -> Result<AddressSet, ResolveError>;
}

/// Which resolved addresses are dialed. IPv4 unless `--ipv6` asks otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AddressFamily {
    #[default]
    V4,
    V6,
}

impl AddressFamily {
    /// Conflicting flags are rejected before this is reached.
    #[must_use]
    pub const fn from_flags(ipv4_only: bool, ipv6_only: bool) -> Self {
        if ipv6_only && !ipv4_only {
            AddressFamily::V6
        } else {
            AddressFamily::V4
        }
    }

    const fn accepts(self, addr: &IpAddr) -> bool {
        match self {
            AddressFamily::V4 => addr.is_ipv4(),
            AddressFamily::V6 => addr.is_ipv6(),
        }
    }
}

/// Resolves through the operating system (`getaddrinfo`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver {
    family: AddressFamily,
}

impl SystemResolver {
    #[must_use]
    pub const fn new(family: AddressFamily) -> Self {
        Self { family }
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, host: &str, port: u16) -> Result<AddressSet, ResolveError> {
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: host.to_owned(),
                port,
                source,
            })?;
        let set: AddressSet = addrs
            .map(|addr| addr.ip())
            .filter(|ip| self.family.accepts(ip))
            .collect();
        if set.is_empty() {
            return Err(ResolveError::NoAddresses {
                host: host.to_owned(),
            });
        }
        Ok(set)
    }
}

/// Re-resolves the endpoint every `every` until `scope` is cancelled.
///
/// Successful lookups replace `addresses`; when the content changed a
/// notification is offered on `changes` and dropped if one is already
/// pending. Failed lookups are logged and leave `addresses` untouched.
pub async fn run_resolver(
    resolver: Arc<dyn HostResolver>,
    endpoint: Arc<Endpoint>,
    addresses: Arc<AddressState>,
    every: Duration,
    changes: ChangeSender,
    scope: CancellationToken,
) {
    // The startup lookup already happened; first refresh is one period out.
    let Some(first_refresh) = Instant::now().checked_add(every) else {
        scope.cancelled().await;
        debug!("Resolver for {} stopped", endpoint.hostname());
        return;
    };
    let mut ticker = interval_at(first_refresh, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = scope.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let lookup = tokio::select! {
            biased;
            () = scope.cancelled() => break,
            result = resolver.resolve(endpoint.hostname(), endpoint.port()) => result,
        };

        let resolved = match lookup {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!("DNS refresh for {} failed: {}", endpoint.hostname(), err);
                continue;
            }
        };

        if !addresses.replace(resolved.clone()) {
            debug!("DNS refresh for {}: unchanged", endpoint.hostname());
            continue;
        }

        info!(
            "Addresses for {} changed: [{}]",
            endpoint.hostname(),
            resolved
        );
        match changes.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                debug!("Change notification already pending; coalesced");
            }
            Err(TrySendError::Closed(())) => break,
        }
    }

    debug!("Resolver for {} stopped", endpoint.hostname());
}
