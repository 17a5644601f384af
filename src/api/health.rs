use axum::response::Json;
use serde_json::{Value, json};

/// Liveness check for the callback server.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
