//! Command implementations.

mod generate;
mod monitor;
mod relay;
mod stream;
mod validate;

pub use self::generate::run_generate;
pub use self::monitor::run_monitor;
pub use self::relay::run_relay;
pub use self::stream::run_stream;
pub use self::validate::run_validate;

use std::future::Future;

use tracing::warn;

/// Drive `task` until it finishes or the process is asked to stop
///
/// Returns `None` when a shutdown signal arrived first.
pub(crate) async fn until_shutdown<T, E, F>(task: F) -> Result<Option<T>, E>
where
    F: Future<Output = Result<T, E>>,
{
    tokio::select! {
        result = task => result.map(Some),
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, stopping");
            Ok(None)
        }
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
