use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Sheet Groups API",
            "version": version,
            "description": "Reads Google Sheets, groups rows by a column and stores the result",
            "endpoints": {
                "health": "/health (public)",
                "auth": "/auth/google, /auth/google/callback (public - sign-in)",
                "profile": "/api/auth/profile (admin)",
                "sheets": "/api/sheets/recent, /api/sheets/:id (admin)",
                "headers": "/api/sheets/:sheet_id/headers (admin)",
                "process": "/api/sheets/:sheet_id/process-raw/:group_name (admin)",
            }
        }
    }))
}

/// GET /health - liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
