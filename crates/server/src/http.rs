//! Listener lifecycle: `start` binds and serves in the background, `stop`
//! drains in-flight requests up to a deadline and then cuts them off.
//!
//! Connections are served by tasks the server owns (a `JoinSet`), so a
//! deadline abort reaches every request still running.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::errors::ServerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Unstarted,
    Listening,
    Draining,
    Stopped,
}

struct Running {
    local_addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    abort_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct HttpServer {
    addr: SocketAddr,
    router: Router,
    state: ServerState,
    running: Option<Running>,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, router: Router) -> Self {
        Self { addr, router, state: ServerState::Unstarted, running: None }
    }

    pub fn state(&self) -> ServerState { self.state }

    /// Bound address once listening; differs from the configured one when
    /// port 0 was requested.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    /// Bind and start serving. On bind failure the server stays `Unstarted`.
    ///
    /// A port held by another socket fails with `AddrInUse`. Starting the
    /// same instance twice never reaches the bind and fails with
    /// `AlreadyStarted`, the same-instance form of that error.
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.state != ServerState::Unstarted {
            return Err(ServerError::AlreadyStarted);
        }
        let listener = TcpListener::bind(self.addr).await.map_err(|e| match e.kind() {
            io::ErrorKind::AddrInUse => ServerError::AddrInUse(self.addr),
            _ => ServerError::Bind { addr: self.addr, source: e },
        })?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind { addr: self.addr, source: e })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (abort_tx, abort_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(serve(listener, self.router.clone(), shutdown_rx, abort_rx));

        info!(addr = %local_addr, event = "listening", "Starting HTTP server at {}", local_addr);
        self.running = Some(Running { local_addr, shutdown_tx, abort_tx, task });
        self.state = ServerState::Listening;
        Ok(local_addr)
    }

    /// Stop accepting connections and wait up to `deadline` for in-flight
    /// requests. No-op unless listening. On expiry every open connection is
    /// aborted before `DrainTimeout` is returned.
    pub async fn stop(&mut self, deadline: Duration) -> Result<(), ServerError> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        self.state = ServerState::Draining;
        info!(addr = %running.local_addr, event = "draining", ?deadline, "stopping HTTP server");

        let _ = running.shutdown_tx.send(true);
        let mut task = running.task;
        let res = tokio::time::timeout(deadline, &mut task).await;

        let out = match res {
            Ok(Ok(())) => {
                info!(addr = %running.local_addr, event = "stopped", "HTTP server stopped");
                Ok(())
            }
            Ok(Err(join)) => Err(ServerError::Serve(join.to_string())),
            Err(_) => {
                let _ = running.abort_tx.send(());
                // serve 任务在返回前会回收所有被中止的连接
                let _ = task.await;
                warn!(addr = %running.local_addr, event = "drain_timeout", ?deadline, "in-flight requests aborted at shutdown deadline");
                Err(ServerError::DrainTimeout(deadline))
            }
        };
        self.state = ServerState::Stopped;
        out
    }
}

/// Accept loop. Returns once the listener is closed and every connection
/// has finished or been aborted.
async fn serve(
    listener: TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
    mut abort_rx: oneshot::Receiver<()>,
) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    connections.spawn(serve_connection(stream, peer, app.clone(), shutdown_rx.clone()));
                }
                Err(e) => {
                    warn!(error = %e, event = "accept_failed", "accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                }
            },
            // A dropped sender also means shutdown.
            _ = shutdown_rx.changed() => break,
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
    drop(listener);

    let drained = async {
        while connections.join_next().await.is_some() {}
    };
    let aborted = tokio::select! {
        _ = drained => false,
        _ = &mut abort_rx => true,
    };
    if aborted {
        debug!(open = connections.len(), "aborting open connections");
        connections.abort_all();
        while connections.join_next().await.is_some() {}
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let conn = http1::Builder::new()
        .serve_connection(TokioIo::new(stream), TowerToHyperService::new(app));
    tokio::pin!(conn);

    let mut closing = false;
    loop {
        tokio::select! {
            res = conn.as_mut() => {
                if let Err(e) = res {
                    debug!(%peer, error = %e, "connection closed with error");
                }
                break;
            }
            _ = shutdown_rx.changed(), if !closing => {
                // 完成当前请求后关闭连接
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}
