//! Shutdown coordination.

use std::future::Future;
use std::io;

use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server and any background task
/// subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Wait for `signal` or for `server` to end on its own, whichever comes
    /// first. On a signal the shutdown is triggered and the server drained.
    pub async fn run_until<S>(
        &self,
        mut server: JoinHandle<io::Result<()>>,
        signal: S,
    ) -> io::Result<()>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            joined = &mut server => {
                let result = flatten(joined);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "HTTP server exited unexpectedly");
                }
                return result;
            }
            _ = signal => {}
        }

        self.trigger();
        flatten(server.await)
    }
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
