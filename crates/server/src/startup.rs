use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use configs::AppConfig;
use service::{Connection, LookupService, Store};
use service::store::MysqlStore;
use tracing::info;

use crate::errors::{ServerError, StartupError};
use crate::http::HttpServer;
use crate::routes;

/// Key looked up once at startup before the listener accepts connections.
pub const DIAGNOSTIC_KEY: &str = "hello";

/// Fully wired application: service plus the HTTP layer bound to it.
pub struct App<S: Store> {
    service: Arc<LookupService<S>>,
    http: HttpServer,
}

/// What `App::start` observed.
#[derive(Debug, Clone)]
pub struct Started {
    pub local_addr: SocketAddr,
    pub diagnostic: String,
}

/// Wire the MySQL-backed application from configuration:
/// bind address → connection → store → service → router → server.
pub async fn build(cfg: &AppConfig) -> Result<App<MysqlStore>, StartupError> {
    let addr = cfg
        .server
        .bind_addr()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    let connection = Connection::parse(&cfg.store.connection).map_err(StartupError::Store)?;
    let store = MysqlStore::connect(connection).await.map_err(StartupError::Store)?;
    Ok(App::new(addr, Arc::new(store)))
}

impl<S: Store + 'static> App<S> {
    pub fn new(addr: SocketAddr, store: Arc<S>) -> Self {
        let service = Arc::new(LookupService::new(store));
        let router = routes::build_router(Arc::clone(&service));
        let http = HttpServer::new(addr, router);
        Self { service, http }
    }

    pub fn service(&self) -> &Arc<LookupService<S>> { &self.service }

    pub fn http(&self) -> &HttpServer { &self.http }

    /// Run the diagnostic lookup, then start listening.
    pub async fn start(&mut self) -> Result<Started, StartupError> {
        let diagnostic = self
            .service
            .lookup(DIAGNOSTIC_KEY)
            .await
            .map_err(StartupError::Diagnostic)?;
        info!(event = "diagnostic", key = DIAGNOSTIC_KEY, value = %diagnostic, "startup lookup");
        println!("{diagnostic}");

        let local_addr = self.http.start().await?;
        Ok(Started { local_addr, diagnostic })
    }

    pub async fn stop(&mut self, deadline: Duration) -> Result<(), ServerError> {
        self.http.stop(deadline).await
    }
}

/// Public entry: build the app, serve until `shutdown` resolves, then drain.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let mut app = build(&cfg).await?;
    let started = app.start().await?;
    info!(addr = %started.local_addr, "lookup service ready");

    shutdown.await;
    info!(event = "shutdown_signal", "shutdown requested, draining");
    app.stop(cfg.server.shutdown_timeout()).await?;
    Ok(())
}
