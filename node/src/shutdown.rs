//! Graceful shutdown for the node's lifecycle loops.
//!
//! The controller owns two things: the broadcast signal every loop selects
//! on, and the `JoinHandle`s of the loops themselves. [`stop`] first
//! raises the signal, then awaits each registered loop; a loop observes
//! cancellation at its next suspension point and discards whatever
//! half-built block it was holding. Nothing is force-aborted.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinates shutdown of the consent loop, the pack loop, and the
/// auxiliary tasks the node spawns alongside them.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            tasks: Vec::new(),
        }
    }

    /// A receiver for a loop's `select!` branch.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Track a spawned lifecycle task; [`stop`] will wait for it.
    pub fn register(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    /// Raise the shutdown signal without waiting for the loops.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Raise the shutdown signal and wait for every registered loop to
    /// wind down.
    pub async fn stop(&mut self) {
        self.shutdown();
        for task in self.tasks.drain(..) {
            if task.await.is_err() {
                tracing::warn!("lifecycle task died before a clean exit");
            }
        }
    }

    /// Park until SIGINT or SIGTERM arrives, then raise the signal.
    pub async fn wait_for_signal(&self) {
        interrupted().await;
        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves when the process receives SIGINT or, on unix, SIGTERM.
async fn interrupted() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT, shutting down"),
            _ = term.recv() => tracing::info!("received SIGTERM, shutting down"),
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("received interrupt, shutting down");
    }
}
