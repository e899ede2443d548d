use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::TransportError;
use crate::http::{DialTarget, RequestSynthesizer, Transport};
use crate::target::{AddressState, Endpoint};

/// Pause used only if the address set is somehow empty, so the loop
/// cannot spin.
const EMPTY_ADDRESS_PAUSE: Duration = Duration::from_millis(50);

/// Everything a worker needs, shared by the whole pool.
pub struct WorkerContext {
    pub endpoint: Arc<Endpoint>,
    pub addresses: Arc<AddressState>,
    pub synthesizer: Arc<dyn RequestSynthesizer>,
    pub transport: Arc<dyn Transport>,
    pub request_timeout: Duration,
    pub read_limit: usize,
}

/// Issues requests back to back until `scope` is cancelled.
///
/// The supervisor runs each worker inside a `worker{id, serial}` span, so
/// every event here carries the identity of the handle that issued it.
///
/// Each iteration runs under a sub-scope made of `scope` plus the request
/// timeout; cancelling `scope` drops the in-flight exchange, which closes its
/// socket. Failures are logged and the loop moves straight on.
pub async fn run_worker(context: Arc<WorkerContext>, scope: CancellationToken) {
    let mut rng = StdRng::from_entropy();
    let mut iterations: u64 = 0;

    loop {
        if scope.is_cancelled() {
            break;
        }

        let snapshot = context.addresses.snapshot();
        let Some(ip) = snapshot.choose(&mut rng) else {
            tokio::select! {
                biased;
                () = scope.cancelled() => {}
                () = tokio::time::sleep(EMPTY_ADDRESS_PAUSE) => {}
            }
            continue;
        };
        let request = context.synthesizer.synthesize(&context.endpoint, &snapshot);
        let target = DialTarget::for_endpoint(&context.endpoint, ip);

        let outcome = tokio::select! {
            biased;
            () = scope.cancelled() => break,
            outcome = timeout(
                context.request_timeout,
                context.transport.exchange(&target, &request, context.read_limit),
            ) => outcome,
        };

        match outcome {
            Ok(Ok(bytes)) => trace!(bytes, "Response prefix drained"),
            Ok(Err(err)) => debug!("Request failed: {}", err),
            Err(_) => debug!(
                "Request failed: {}",
                TransportError::Timeout {
                    timeout: context.request_timeout
                }
            ),
        }
        iterations = iterations.wrapping_add(1);
    }

    debug!(iterations, "Worker stopped");
}
