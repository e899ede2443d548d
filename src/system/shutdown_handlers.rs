use tokio_util::sync::CancellationToken;
use tracing::warn;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels `run_scope` on the first Ctrl+C (or SIGTERM on Unix).
///
/// The task also exits quietly once `run_scope` is cancelled by anyone else,
/// so at most one early-termination event is ever reported.
pub fn setup_signal_shutdown_handler(run_scope: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let run_scope = run_scope.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                biased;
                () = run_scope.cancelled() => return,
                result = tokio::signal::ctrl_c() => {
                    if let Err(err) = result {
                        warn!("Failed to listen for Ctrl+C: {}", err);
                        return;
                    }
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {}
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                biased;
                () = run_scope.cancelled() => return,
                result = tokio::signal::ctrl_c() => {
                    if let Err(err) = result {
                        warn!("Failed to listen for Ctrl+C: {}", err);
                        return;
                    }
                }
            }
        }

        println!("Signal received: shutting down early.");
        run_scope.cancel();
    })
}
