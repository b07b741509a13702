/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres",
///   "database": "connected"
/// }
/// ```
///
/// `database` is omitted for the in-memory backend.

use crate::app::{AppState, Storage};
use crate::error::ApiResult;
use axum::{extract::State, Json};
use flowgate_shared::db::pool;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    pub storage: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match &state.storage {
        Storage::Postgres(db) => Some(match pool::health_check(db).await {
            Ok(()) => "connected",
            Err(err) => {
                tracing::warn!(error = %err, "Database health check failed");
                "disconnected"
            }
        }),
        Storage::Memory => None,
    };

    let status = if database == Some("disconnected") {
        "degraded"
    } else {
        "healthy"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.config.storage.backend.to_string(),
        database: database.map(str::to_string),
    }))
}
