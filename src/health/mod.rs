/*!
 * # Health Check Module
 *
 * - Basic health check (`/health`) - process is up and the database answers
 * - Readiness check (`/health/ready`) - database reachable and migrated
 * - Liveness check (`/health/live`) - process is alive
 * - Version (`/health/version`)
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub latency_ms: u128,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: HashMap<String, HealthDetail>,
}

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: Arc<DatabaseConnection>,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            start_time: Instant::now(),
        }
    }

    async fn check_database(&self) -> HealthDetail {
        let start = Instant::now();
        let status = match self.db_pool.ping().await {
            Ok(_) => HealthDetail {
                status: HealthStatus::Up,
                message: None,
                latency_ms: 0,
            },
            Err(e) => {
                error!("Database health check failed: {}", e);
                HealthDetail {
                    status: HealthStatus::Down,
                    message: Some(e.to_string()),
                    latency_ms: 0,
                }
            }
        };
        HealthDetail {
            latency_ms: start.elapsed().as_millis(),
            ..status
        }
    }

    /// The listings table only exists once migrations have run
    async fn check_schema(&self) -> HealthDetail {
        let start = Instant::now();
        let backend = self.db_pool.get_database_backend();
        let result = self
            .db_pool
            .query_one(Statement::from_string(
                backend,
                "SELECT COUNT(*) AS n FROM sell_listings",
            ))
            .await;
        let (status, message) = match result {
            Ok(_) => (HealthStatus::Up, None),
            Err(e) => (HealthStatus::Down, Some(e.to_string())),
        };
        HealthDetail {
            status,
            message,
            latency_ms: start.elapsed().as_millis(),
        }
    }

    pub async fn collect(&self, include_schema: bool) -> HealthInfo {
        let mut details = HashMap::new();
        details.insert("database".to_string(), self.check_database().await);
        if include_schema {
            details.insert("schema".to_string(), self.check_schema().await);
        }

        let status = if details.values().any(|d| d.status == HealthStatus::Down) {
            HealthStatus::Down
        } else {
            HealthStatus::Up
        };

        HealthInfo {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            details,
        }
    }
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    let health = state.collect(false).await;
    (
        status_code(health.status),
        Json(json!({
            "status": health.status,
            "version": health.version,
            "timestamp": health.timestamp,
        })),
    )
}

pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let health = state.collect(true).await;
    (status_code(health.status), Json(health))
}

pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(json!({
        "alive": true,
        "uptime_seconds": state.start_time.elapsed().as_secs(),
    }))
}

pub fn health_routes<S>(db_pool: Arc<DatabaseConnection>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let health_state = Arc::new(HealthState::new(db_pool));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(health_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection, run_migrations};

    #[tokio::test]
    async fn readiness_reports_missing_schema() {
        let db = Arc::new(establish_connection("sqlite::memory:").await.unwrap());
        let state = HealthState::new(db.clone());

        let before = state.collect(true).await;
        assert_eq!(before.status, HealthStatus::Down);
        assert_eq!(before.details["database"].status, HealthStatus::Up);

        run_migrations(&db).await.unwrap();
        let after = state.collect(true).await;
        assert_eq!(after.status, HealthStatus::Up);
    }
}
