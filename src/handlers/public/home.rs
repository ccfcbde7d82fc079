// handlers/public/home.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use serde_json::json;

use crate::state::AppState;
use crate::views::{self, PageContext, View};

/// GET / - landing page, rendered for anonymous and logged-in visitors alike
pub async fn home(page: PageContext) -> Html<String> {
    views::render(&View::Home, &page)
}

/// GET /health - liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "version": env!("CARGO_PKG_VERSION"),
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            let mut data = json!({
                "status": "degraded",
                "timestamp": now,
            });
            if state.config.security.expose_store_errors {
                data["database_error"] = json!(e.to_string());
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": data
                })),
            )
        }
    }
}
