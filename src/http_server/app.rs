use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use color_eyre::eyre::{WrapErr, eyre};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::http_server::{routes, state::AppState};
use crate::lastfm::LastfmClient;
use crate::services::recommend::RecommendService;
use crate::spotify::SpotifyCatalog;

async fn root() -> &'static str {
    "cratedigger"
}

pub async fn start(
    port: u16,
    service: RecommendService<SpotifyCatalog, LastfmClient>,
) -> color_eyre::Result<()> {
    let app_state = Arc::new(AppState { service });

    #[cfg(debug_assertions)]
    let cors_layer = CorsLayer::permissive();

    #[cfg(not(debug_assertions))]
    let cors_layer = CorsLayer::new();

    let app = Router::new()
        .route("/", get(root))
        .route("/recommend", post(routes::recommend::recommend))
        .layer(ServiceBuilder::new().layer(cors_layer))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .wrap_err_with(|| eyre!("Failed to bind to port {}", port))?;
    axum::serve(listener, app)
        .await
        .wrap_err("Failed to start HTTP server")?;

    Ok(())
}
