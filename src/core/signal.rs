//! Termination signals as a cancellation source.
//!
//! The first signal cancels the token so the run can stop cleanly after the
//! object in flight. A second one exits the process at once.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit status after a second termination signal (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task that cancels the returned token on SIGINT, SIGTERM, SIGHUP
/// or SIGQUIT (Ctrl+C only on non-Unix platforms), and exits the process
/// with [`FORCED_EXIT_CODE`] on the next one.
///
/// Must be called from within a Tokio runtime.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(forward_signals(tx));

    let watched = token.clone();
    tokio::spawn(async move {
        if let Some(name) = watch(rx, watched).await {
            warn!(signal = name, "received a second termination signal, exiting now");
            std::process::exit(FORCED_EXIT_CODE);
        }
    });
    token
}

/// Cancel `token` on the first signal received, then wait for another.
///
/// Returns the name of the second signal, or `None` once the source closes.
pub async fn watch(
    mut signals: mpsc::UnboundedReceiver<&'static str>,
    token: CancellationToken,
) -> Option<&'static str> {
    let name = signals.recv().await?;
    info!(signal = name, "received termination signal");
    token.cancel();
    signals.recv().await
}

#[cfg(unix)]
async fn forward_signals(tx: mpsc::UnboundedSender<&'static str>) {
    use tokio::signal::unix::{signal, Signal, SignalKind};

    fn install(kind: SignalKind, name: &str) -> Option<Signal> {
        signal(kind)
            .map_err(|e| warn!(signal = name, error = %e, "failed to install signal handler"))
            .ok()
    }

    async fn recv(stream: &mut Option<Signal>) {
        match stream {
            Some(s) => {
                s.recv().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    let mut interrupt = install(SignalKind::interrupt(), "SIGINT");
    let mut terminate = install(SignalKind::terminate(), "SIGTERM");
    let mut hangup = install(SignalKind::hangup(), "SIGHUP");
    let mut quit = install(SignalKind::quit(), "SIGQUIT");

    loop {
        let name = tokio::select! {
            _ = recv(&mut interrupt) => "SIGINT",
            _ = recv(&mut terminate) => "SIGTERM",
            _ = recv(&mut hangup) => "SIGHUP",
            _ = recv(&mut quit) => "SIGQUIT",
        };
        if tx.send(name).is_err() {
            return;
        }
    }
}

#[cfg(not(unix))]
async fn forward_signals(tx: mpsc::UnboundedSender<&'static str>) {
    loop {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            return;
        }
        if tx.send("Ctrl+C").is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_signal_cancels_second_escalates() {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let watcher = tokio::spawn(watch(rx, token.clone()));

        tx.send("SIGTERM").unwrap();
        token.cancelled().await;
        assert!(!watcher.is_finished());

        tx.send("SIGINT").unwrap();
        assert_eq!(watcher.await.unwrap(), Some("SIGINT"));
    }

    #[tokio::test]
    async fn test_closed_source_never_cancels() {
        let (tx, rx) = mpsc::unbounded_channel::<&'static str>();
        let token = CancellationToken::new();
        drop(tx);

        assert_eq!(watch(rx, token.clone()).await, None);
        assert!(!token.is_cancelled());
    }
}
