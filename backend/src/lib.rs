use axum::{
    http::{
        header::{HeaderName, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod state;
pub mod upstream;
pub mod utils;

use config::Config;
use error::AppError;
use state::AppState;

/// Builds the application router with all middleware attached.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/auth/reissue", post(handlers::auth::reissue))
        .route("/auth/session", get(handlers::auth::session))
        .route("/health", get(handlers::health::health))
        .route("/{locale}", get(handlers::shell::shell))
        .route("/{locale}/{*rest}", get(handlers::shell::shell))
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::locale::locale_routing,
        ))
        .layer(axum_middleware::from_fn(
            middleware::logging::log_error_responses,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id::request_id))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            HeaderName::from_static(middleware::request_id::REQUEST_ID_HEADER),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(24 * 60 * 60));
    match config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => layer.allow_origin(origin),
        None => layer,
    }
}
