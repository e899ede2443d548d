//! The run lifecycle: root controller, worker supervisor and worker loop.
mod controller;
mod supervisor;
mod worker;


pub use controller::{Collaborators, RunEnd, RunReport, RunSettings, run_controller};
pub use supervisor::{Supervisor, SupervisorState, WorkerHandle};
pub use worker::{WorkerContext, run_worker};
