use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult};
use crate::http::{RequestSynthesizer, Transport};
use crate::target::{AddressSet, AddressState, Endpoint, HostResolver, change_channel, run_resolver};

use super::supervisor::Supervisor;
use super::worker::WorkerContext;

/// Validated parameters of one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub endpoint: Endpoint,
    pub workers: PositiveUsize,
    pub duration: Duration,
    pub request_timeout: Duration,
    pub refresh_interval: Duration,
    pub read_limit: usize,
}

/// The external pieces the run drives.
#[derive(Clone)]
pub struct Collaborators {
    pub resolver: Arc<dyn HostResolver>,
    pub transport: Arc<dyn Transport>,
    pub synthesizer: Arc<dyn RequestSynthesizer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    Deadline,
    Interrupted,
}

impl fmt::Display for RunEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEnd::Deadline => f.write_str("duration reached"),
            RunEnd::Interrupted => f.write_str("interrupted"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub end: RunEnd,
    pub elapsed: Duration,
    pub replacements: u64,
    pub initial_addresses: AddressSet,
}

/// Drives one run from the startup lookup to the final `cancel_all`.
///
/// `run_scope` is the run's root token. It is cancelled here when the
/// duration elapses; anyone else cancelling it (a signal handler) ends the
/// run early. The startup lookup is the only fatal failure: it returns before
/// any worker is spawned.
///
/// # Errors
///
/// Returns an error when the startup resolution fails or a run task panics.
pub async fn run_controller(
    settings: RunSettings,
    collaborators: Collaborators,
    run_scope: CancellationToken,
) -> AppResult<RunReport> {
    let endpoint = Arc::new(settings.endpoint);
    let initial = collaborators
        .resolver
        .resolve(endpoint.hostname(), endpoint.port())
        .await
        .map_err(AppError::resolve)?;
    info!("Resolved {} to [{}]", endpoint.hostname(), initial);

    let started = Instant::now();
    let addresses = Arc::new(AddressState::new(initial.clone()));
    let (changes_tx, changes_rx) = change_channel();

    let resolver_task = tokio::spawn(run_resolver(
        Arc::clone(&collaborators.resolver),
        Arc::clone(&endpoint),
        Arc::clone(&addresses),
        settings.refresh_interval,
        changes_tx,
        run_scope.child_token(),
    ));

    let context = Arc::new(WorkerContext {
        endpoint,
        addresses,
        synthesizer: collaborators.synthesizer,
        transport: collaborators.transport,
        request_timeout: settings.request_timeout,
        read_limit: settings.read_limit,
    });
    let supervisor = Arc::new(Supervisor::new(
        settings.workers,
        run_scope.clone(),
        context,
    ));
    let supervisor_task = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move { supervisor.run(changes_rx).await })
    };

    let end = tokio::select! {
        biased;
        () = run_scope.cancelled() => RunEnd::Interrupted,
        () = deadline(started, settings.duration) => {
            run_scope.cancel();
            RunEnd::Deadline
        }
    };
    debug!("Run scope ended: {}", end);

    supervisor_task.await?;
    resolver_task.await?;

    Ok(RunReport {
        end,
        elapsed: started.elapsed(),
        replacements: supervisor.replacements(),
        initial_addresses: initial,
    })
}

/// Sleeps until `started + duration`; a deadline past the clock's range never fires.
async fn deadline(started: Instant, duration: Duration) {
    match started.checked_add(duration) {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
