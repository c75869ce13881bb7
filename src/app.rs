use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::routes::{analysis, health, prices};
use crate::state::AppState;

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    match config.cors_allow_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => base.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS_ALLOW_ORIGIN: {}", e);
            base.allow_origin(Any)
        }
        None => base.allow_origin(Any),
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/prices", prices::router())
        .nest("/api/analysis", analysis::router())
        .layer(cors)
        .with_state(state)
}
