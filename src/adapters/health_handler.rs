use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::FormSchema;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub schema: String,
    pub fields: usize,
}

pub struct HealthHandler {
    schema: Arc<FormSchema>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self {
            schema,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks {
                schema: "ok".to_string(),
                fields: self.schema.len(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - a form with no fields has nothing to serve
    pub async fn ready(&self) -> impl IntoResponse {
        if self.schema.is_empty() {
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": "Schema defines no fields"
            })))
        } else {
            (StatusCode::OK, Json(serde_json::json!({
                "status": "ready",
                "message": "Server is ready to accept requests"
            })))
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}
