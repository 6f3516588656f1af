use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use scout_core::{Error, Result};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

/// Request bodies carry whole article batches
pub const BODY_LIMIT: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Only this origin may call the API; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_origin: None,
        }
    }
}

pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    match origin {
        None => Ok(CorsLayer::permissive()),
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .map_err(|e| Error::InvalidUrl(format!("Invalid CORS origin {}: {}", origin, e)))?;
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any))
        }
    }
}

pub fn create_app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/search", get(handlers::search))
        .route("/api/generate-summary", post(handlers::generate_summary))
        .route("/save-article", post(handlers::save_article))
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/batches", get(handlers::list_batches))
        .route("/api/saveUserInput", post(handlers::save_user_input))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = create_app(state, cors_layer(config.cors_origin.as_deref())?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("Invalid listen address: {}", e)))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 Server is running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState, ServerConfig};
    pub use scout_core::{Error, Result};
}
