use crate::config::ServerConfig;
use crate::server::{routes, static_files};
use crate::state::AppState;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the Axum application
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);

    // API routes
    let api_routes = Router::new()
        .route("/health", get(routes::health))
        .route("/config", get(routes::get_config))
        .route("/defaults", get(routes::get_defaults))
        .route("/predict", post(routes::predict))
        .route("/stats", get(routes::get_stats));

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(routes::prometheus_metrics))
        .fallback(static_files::serve_static)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Cross-origin access for pages served from the configured listen address.
///
/// The form itself is same-origin; this only admits other tabs pointed at the
/// same host and port under its loopback aliases.
pub fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let mut hosts = vec![server.address.clone()];
    if matches!(server.address.as_str(), "127.0.0.1" | "0.0.0.0" | "localhost") {
        hosts.extend(["127.0.0.1".to_string(), "localhost".to_string()]);
    }
    hosts.sort();
    hosts.dedup();

    let origins: Vec<HeaderValue> = hosts
        .iter()
        .filter(|host| host.as_str() != "0.0.0.0")
        .filter_map(|host| {
            HeaderValue::from_str(&format!("http://{}:{}", host, server.port)).ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the server until `shutdown` resolves
pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_app(state);

    tracing::info!("Starting ricegrain server on {}", addr);
    tracing::info!("Open http://{} in your browser", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
