//! HTTP control plane for the permission store.
//!
//! Runs its own single-threaded Tokio runtime on a dedicated OS thread
//! so the game thread never blocks on a network call, following the
//! embedded-server-next-to-a-synchronous-core pattern: a `Router` built
//! once, served from `axum::serve` inside a `current_thread` runtime,
//! torn down by a `oneshot` shutdown signal.

mod error;
mod routes;
mod steamid;

use std::net::SocketAddr;
use std::thread::JoinHandle;

use axum::extract::DefaultBodyLimit;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP control plane is already running")]
    AlreadyRunning,
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, std::io::Error),
    #[error("failed to spawn control-plane thread: {0}")]
    Spawn(std::io::Error),
}

/// A running control plane. Dropping this without calling [`Server::stop`]
/// leaks the background thread; `stop` is the intended teardown path.
pub struct Server {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Server {
    /// Bind `addr` and start serving in a dedicated thread. Returns once
    /// the listener is bound, before the first request is accepted.
    pub fn start(addr: SocketAddr) -> Result<Self, HttpError> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = std::thread::Builder::new()
            .name("gostrike-http".to_string())
            .spawn(move || run(addr, ready_tx, shutdown_rx))
            .map_err(HttpError::Spawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { shutdown_tx: Some(shutdown_tx), handle: Some(handle) }),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(HttpError::Bind(addr, err))
            }
            Err(_) => {
                let _ = handle.join();
                Err(HttpError::Bind(addr, std::io::Error::new(std::io::ErrorKind::Other, "control-plane thread exited before binding")))
            }
        }
    }

    /// Signal the server to stop accepting new requests, drain
    /// in-flight ones, and join its thread. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    addr: SocketAddr,
    ready_tx: std::sync::mpsc::Sender<Result<(), std::io::Error>>,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ready_tx.send(Err(err));
            return;
        }
    };

    runtime.block_on(async move {
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => {
                let _ = ready_tx.send(Ok(()));
                listener
            }
            Err(err) => {
                let _ = ready_tx.send(Err(err));
                return;
            }
        };

        let app = router();
        tracing::info!(%addr, "HTTP control plane listening");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;

        if let Err(err) = result {
            tracing::error!(%err, "HTTP control plane exited with an error");
        }
    });
}

fn router() -> axum::Router {
    axum::Router::new()
        .nest("/api/permissions", routes::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn start_and_stop_round_trip() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        // port 0 lets the OS pick a free port; we only assert the start/stop
        // lifecycle doesn't hang or panic, not reachability of a fixed port.
        let mut server = Server::start(addr).unwrap();
        server.stop();
    }
}
