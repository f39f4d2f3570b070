//! HTTP exposition server: scrape endpoint plus a static landing page.

use crate::metrics::Metrics;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

const TEXT_EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const LANDING_PAGE: &str = r#"<html>
	<head><title>Figo Prometheus Exporter</title></head>
	<body>
		<h1>Figo Prometheus Exporter</h1>
		<ol>
			<li><a href="/metrics">Metrics</a></li>
			<li><a href="https://home.figo.me/">Figo Home</a></li>
		</ol>
	</body>
</html>
"#;

pub fn router(metrics: Metrics) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/metrics", get(serve_metrics))
        .with_state(metrics)
}

async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}

async fn serve_metrics(State(metrics): State<Metrics>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, TEXT_EXPOSITION_CONTENT_TYPE)],
        metrics.render(),
    )
}

/// Serve the current metric snapshot until the process exits.
pub async fn serve(addr: SocketAddr, metrics: Metrics) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "exposition server listening");

    axum::serve(listener, router(metrics))
        .await
        .context("exposition server failed")?;
    Ok(())
}
