use crate::config::{self, Config};
use crate::db::{self, ConnectionPool, ConnectionResult};
use crate::resilience::ResilientClient;
use axum::extract::Request;
use axum::{Router, ServiceExt};
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::signal::unix::SignalKind;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state handed to every axum handler. `shutdown` is cancelled once
/// when the process receives a shutdown signal; long-running scraper and
/// ingest tasks poll it to honor the cancellation contract (§5).
#[derive(Clone)]
pub struct AppState {
    pub connection_pool: ConnectionPool,
    pub config: Arc<Config>,
    pub client: Arc<ResilientClient>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        let client = Arc::new(ResilientClient::new(config.http.clone()));
        AppState {
            connection_pool,
            config: Arc::new(config),
            client,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn get_connection(&self) -> ConnectionResult {
        self.connection_pool.get()
    }
}

/// Initializes logging using `tracing_subscriber`.
pub fn enable_tracing(config: &Config) {
    let filter = config::warn_on_invalid_env_filter(&config.log_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

pub fn initialize(state: &AppState) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = state.get_connection()?;
    db::run_migrations(&mut conn);
    Ok(())
}

pub async fn run(state: AppState) -> std::io::Result<()> {
    let shutdown = state.shutdown.clone();
    let (router, api) = crate::api::routes(state).split_for_parts();
    let normalized_router = ServiceBuilder::new()
        .layer(NormalizePathLayer::trim_trailing_slash())
        .service(router);
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/apidoc/openapi.json", api))
        .fallback_service(normalized_router);

    let address = format!("0.0.0.0:{}", config::port());
    let listener = TcpListener::bind(address).await?;
    info!("server running on {} threads", Handle::current().metrics().num_workers());
    debug!("listening on {}", listener.local_addr()?);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Ctrl+C handler must be installable");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(SignalKind::terminate())
            .expect("Signal handler must be installable")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Stopping server...");
    shutdown.cancel();
}
