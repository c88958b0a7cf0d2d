use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::ProviderKind;
use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    let providers: Vec<&str> = ProviderKind::ALL
        .iter()
        .filter(|kind| state.is_enabled(**kind))
        .map(|kind| kind.as_str())
        .collect();

    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "providers": providers,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
