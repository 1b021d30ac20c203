use tokio::signal;
use tracing::warn;

/// Resolves once the process is asked to stop: Ctrl+C anywhere, or
/// SIGTERM on unix (what container orchestrators send).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = signal::ctrl_c() => warn!("Ctrl+C received, shutting down"),
            _ = sigterm.recv() => warn!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        warn!("Ctrl+C received, shutting down");
    }
}
