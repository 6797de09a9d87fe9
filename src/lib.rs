//! Dealership API Library
//!
//! Back office of a car dealership: review of cars offered by private sellers
//! and publication of approved listings into the car catalog.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{extract::State, middleware, response::Json, routing::get, Router};
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::config::AppConfig;
use crate::events::EventSender;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: Arc<AppConfig>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), event_sender.clone(), config.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Routes nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(api_status))
        .nest(
            "/sell-listings",
            handlers::sell_listings::sell_listing_routes(),
        )
        .nest("/brands", handlers::brands::brand_routes())
        .nest("/cars", handlers::cars::car_routes())
}

/// Full application: API, health, metrics and Swagger UI with the request-id,
/// tracing, access log, metrics, compression and CORS layers
pub fn app_router(state: AppState, access_logger: slog::Logger) -> Router {
    let logging_state = Arc::new(logging::LoggingState::new(access_logger));
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(|| async { "dealership-api up" }))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/metrics/json", get(metrics::metrics_json_handler))
        .nest("/health", health::health_routes(state.db.clone()))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(middleware::from_fn(metrics::track_http_metrics))
        .layer(middleware::from_fn_with_state(
            logging_state,
            logging::logging_middleware,
        ))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

/// Explicit origins win; otherwise permissive CORS where the config allows
/// it, and no cross-origin access at all elsewhere
pub fn cors_layer(cfg: &AppConfig) -> CorsLayer {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };

    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "database": database,
        "allowReapproval": state.config.allow_reapproval,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::db::*;
    pub use crate::dto::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::metrics::*;
    pub use crate::openapi::*;
    pub use crate::{app_router, AppState};
}
