use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use log::{error, info};
use tokio::net::TcpListener;

use crate::collector::runner::ScrapeOrchestrator;
use crate::exposition;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP front of the exporter.
///
/// Routes:
/// - `/`        plain-text banner
/// - `/metrics` one scrape, rendered as Prometheus text
///
pub fn router(orchestrator: ScrapeOrchestrator) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/metrics", get(handle_metrics))
        .with_state(orchestrator)
}

/// Serves until `shutdown` resolves.
pub async fn run(
    addr: SocketAddr,
    orchestrator: ScrapeOrchestrator,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}. Serving metrics on /metrics.", addr);

    axum::serve(listener, router(orchestrator))
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("shutdown signal received, stopping listener");
        })
        .await?;
    Ok(())
}

async fn handle_root() -> String {
    format!(
        "nforks-exporter version {}\nmetrics are published on /metrics\n",
        VERSION
    )
}

async fn handle_metrics(State(orchestrator): State<ScrapeOrchestrator>) -> Response {
    let samples = orchestrator.scrape().await;

    match exposition::encode(&samples) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, exposition::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("cannot encode metrics: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("encoding error: {}", e)).into_response()
        }
    }
}
