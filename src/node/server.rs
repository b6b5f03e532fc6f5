use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::handlers;

/// Budget for one connection worker, counted from accept. The only
/// cancellation mechanism the node has; there is no per-request timeout.
pub const WORKER_DEADLINE: Duration = Duration::from_secs(10);

/// A storage node: one directory of chunk files behind a TCP listener.
pub struct NodeServer {
    storage_dir: PathBuf,
    worker_deadline: Duration,
}

impl NodeServer {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            worker_deadline: WORKER_DEADLINE,
        }
    }

    /// Overrides the worker deadline. Tests use short deadlines to exercise
    /// the stalled-client path without waiting out the default.
    pub fn with_worker_deadline(mut self, deadline: Duration) -> Self {
        self.worker_deadline = deadline;
        self
    }

    /// Accept loop. Creates the storage directory, then spawns one worker
    /// task per connection until the listener fails.
    pub async fn run(self: Arc<Self>, listener: TcpListener) -> Result<()> {
        tokio::fs::create_dir_all(&self.storage_dir)
            .await
            .with_context(|| {
                format!(
                    "failed to create storage directory {}",
                    self.storage_dir.display()
                )
            })?;

        info!(
            "Storage node serving {} on {}",
            self.storage_dir.display(),
            listener.local_addr()?
        );

        loop {
            let (stream, peer) = listener.accept().await.context("accept failed")?;
            info!("Accepted connection from {}", peer);

            let server = self.clone();
            tokio::spawn(async move {
                let worker = handlers::serve_connection(stream, &server.storage_dir);
                match tokio::time::timeout(server.worker_deadline, worker).await {
                    Ok(Ok(())) => tracing::debug!("Connection from {} closed", peer),
                    Ok(Err(e)) => warn!("Connection from {} failed: {:#}", peer, e),
                    Err(_) => warn!(
                        "Worker for {} exceeded its {:?} deadline, dropping connection",
                        peer, server.worker_deadline
                    ),
                }
            });
        }
    }
}
