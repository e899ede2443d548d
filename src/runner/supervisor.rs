use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::args::PositiveUsize;
use crate::target::ChangeReceiver;

use super::worker::{WorkerContext, run_worker};

/// A running worker as seen by the supervisor.
///
/// `serial` is unique for the whole run, so a respawned worker with the same
/// `id` is still a different handle.
#[derive(Debug)]
pub struct WorkerHandle {
    id: usize,
    serial: u64,
    scope: CancellationToken,
}

impl WorkerHandle {
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    fn cancel(&self) {
        self.scope.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    Replacing,
    Stopped,
}

#[derive(Debug)]
struct Registry {
    state: SupervisorState,
    handles: BTreeMap<usize, WorkerHandle>,
}

/// Keeps exactly `workers` worker tasks alive under the run scope.
///
/// On every change notification the whole pool is cancelled and respawned
/// while the registry lock is held, so observers see either the old pool or
/// the new one. Cancellation is fire-and-forget: workers notice it on their
/// own and the supervisor never joins them.
pub struct Supervisor {
    workers: usize,
    run_scope: CancellationToken,
    context: Arc<WorkerContext>,
    registry: Mutex<Registry>,
    next_serial: AtomicU64,
    replacements: AtomicU64,
}

impl Supervisor {
    #[must_use]
    pub fn new(
        workers: PositiveUsize,
        run_scope: CancellationToken,
        context: Arc<WorkerContext>,
    ) -> Self {
        Self {
            workers: workers.get(),
            run_scope,
            context,
            registry: Mutex::new(Registry {
                state: SupervisorState::Idle,
                handles: BTreeMap::new(),
            }),
            next_serial: AtomicU64::new(0),
            replacements: AtomicU64::new(0),
        }
    }

    /// Starts worker `id` under a child of the run scope.
    ///
    /// A live handle with the same id is cancelled first. Nothing is spawned
    /// once the run scope or the supervisor has stopped.
    pub fn spawn(&self, id: usize) {
        let mut registry = self.lock();
        self.spawn_locked(&mut registry, id);
    }

    /// Cancels every registered worker and empties the registry.
    ///
    /// Safe to call repeatedly and after workers have exited on their own.
    /// Returns how many handles were cancelled.
    pub fn cancel_all(&self) -> usize {
        let mut registry = self.lock();
        Self::cancel_all_locked(&mut registry)
    }

    /// Full stop-and-replace: cancel the pool, then spawn ids `0..workers`.
    pub fn replace_all(&self) {
        let mut registry = self.lock();
        if registry.state == SupervisorState::Stopped || self.run_scope.is_cancelled() {
            return;
        }
        registry.state = SupervisorState::Replacing;
        let cancelled = Self::cancel_all_locked(&mut registry);
        for id in 0..self.workers {
            self.spawn_locked(&mut registry, id);
        }
        registry.state = SupervisorState::Running;
        let round = self
            .replacements
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        info!(
            "Worker pool replaced (round {}): cancelled {}, spawned {}",
            round,
            cancelled,
            registry.handles.len()
        );
    }

    /// Runs the pool until the run scope ends.
    ///
    /// Notifications are taken one at a time, each replacement finishing
    /// before the next is read.
    pub async fn run(&self, mut changes: ChangeReceiver) {
        {
            let mut registry = self.lock();
            if registry.state == SupervisorState::Idle {
                registry.state = SupervisorState::Running;
                for id in 0..self.workers {
                    self.spawn_locked(&mut registry, id);
                }
            }
        }
        debug!("Supervisor running {} workers", self.workers);

        loop {
            let received = tokio::select! {
                biased;
                () = self.run_scope.cancelled() => break,
                received = changes.recv() => received,
            };
            if received.is_none() {
                // Resolver gone: keep the current pool until the run ends.
                self.run_scope.cancelled().await;
                break;
            }
            self.replace_all();
        }

        let mut registry = self.lock();
        registry.state = SupervisorState::Stopped;
        let cancelled = Self::cancel_all_locked(&mut registry);
        debug!("Supervisor stopped; cancelled {} workers", cancelled);
    }

    /// Number of registered, not yet cancelled, workers.
    #[must_use]
    pub fn active_workers(&self) -> usize {
        self.lock().handles.len()
    }

    /// `(id, serial)` of every registered worker, ordered by id.
    #[must_use]
    pub fn handles(&self) -> Vec<(usize, u64)> {
        self.lock()
            .handles
            .values()
            .map(|handle| (handle.id(), handle.serial()))
            .collect()
    }

    #[must_use]
    pub fn state(&self) -> SupervisorState {
        self.lock().state
    }

    /// Completed pool replacements so far.
    #[must_use]
    pub fn replacements(&self) -> u64 {
        self.replacements.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spawn_locked(&self, registry: &mut Registry, id: usize) {
        if registry.state == SupervisorState::Stopped || self.run_scope.is_cancelled() {
            return;
        }
        if let Some(previous) = registry.handles.remove(&id) {
            previous.cancel();
        }

        let scope = self.run_scope.child_token();
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        registry.handles.insert(
            id,
            WorkerHandle {
                id,
                serial,
                scope: scope.clone(),
            },
        );
        let span = info_span!("worker", id, serial);
        tokio::spawn(run_worker(Arc::clone(&self.context), scope).instrument(span));
    }

    fn cancel_all_locked(registry: &mut Registry) -> usize {
        let handles = std::mem::take(&mut registry.handles);
        for handle in handles.values() {
            handle.cancel();
        }
        handles.len()
    }
}
