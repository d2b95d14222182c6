//! HTTP endpoint serving podman metrics and a landing page

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use exporter_lib::{exposition, Collector, ExporterMetrics, StructuredLogger};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub collector: Arc<Collector>,
    pub metrics: ExporterMetrics,
    pub logger: StructuredLogger,
    pub metrics_path: String,
}

impl AppState {
    pub fn new(
        collector: Arc<Collector>,
        metrics: ExporterMetrics,
        logger: StructuredLogger,
        metrics_path: impl Into<String>,
    ) -> Self {
        Self {
            collector,
            metrics,
            logger,
            metrics_path: metrics_path.into(),
        }
    }
}

/// Prometheus metrics endpoint, one podman scrape per request
async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let start = Instant::now();
    let outcome = state.collector.scrape().await;

    state.logger.log_scrape(
        outcome.is_up(),
        outcome.samples.len(),
        start.elapsed().as_millis() as u64,
    );

    match exposition::encode_text(&outcome, &state.metrics.gather()) {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, exposition::CONTENT_TYPE)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}

/// Landing page pointing at the metrics path
async fn splash(State(state): State<Arc<AppState>>) -> Html<String> {
    let metric_list: String = state
        .collector
        .registry()
        .describe()
        .map(|d| format!("<li><code>{}</code> ({}): {}</li>", d.fq_name, d.kind, d.help))
        .collect();

    Html(format!(
        "<html>
<head><title>Podman Exporter</title></head>
<body>
<h1>Podman Exporter</h1>
<p><a href='{path}'>Metrics</a></p>
<ul>{metric_list}</ul>
</body>
</html>
",
        path = state.metrics_path,
    ))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(&state.metrics_path, get(metrics))
        .fallback(splash)
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve(
    addr: SocketAddr,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Listening on address");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
