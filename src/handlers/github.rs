use axum::{extract::State, response::Json, Extension};
use serde_json::Value;
use std::sync::Arc;
use tower_sessions::Session;

use super::require_session;
use crate::auth::ProviderKind;
use crate::error::AuthResult;
use crate::services::GitHubService;
use crate::utils::logging::*;
use crate::AppState;

/// GET /github/profile
pub async fn user_profile(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> AuthResult<Json<Value>> {
    log_request_received("/github/profile", "GET");

    let session = require_session(&session).await?;
    let service = GitHubService::new(state.flow(ProviderKind::GitHub)?.clone());

    Ok(Json(service.user_profile(session).await?))
}
