use axum::response::Json;
use serde_json::Value;

use crate::middleware::CurrentUser;

/// GET /profile - the session's identity claims as JSON
pub async fn profile(user: CurrentUser) -> Json<Value> {
    Json(serde_json::to_value(&user.user).unwrap_or(Value::Null))
}
