use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_sessions::Session;

use super::require_session;
use crate::auth::ProviderKind;
use crate::error::AuthResult;
use crate::services::TodoistService;
use crate::utils::logging::*;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ResourcesQuery {
    /// Lista separada por vírgula, ex.: `projects,items`
    pub types: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectBody {
    pub name: String,
}

fn service(state: &AppState) -> AuthResult<TodoistService> {
    Ok(TodoistService::new(state.flow(ProviderKind::Todoist)?.clone()))
}

/// GET /todoist/resources?types=all
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Query(query): Query<ResourcesQuery>,
) -> AuthResult<Json<Value>> {
    log_request_received("/todoist/resources", "GET");

    let session = require_session(&session).await?;
    let types: Vec<String> = query
        .types
        .as_deref()
        .unwrap_or("all")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Json(service(&state)?.resources(session, &types).await?))
}

/// GET /todoist/projects
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> AuthResult<Json<Value>> {
    log_request_received("/todoist/projects", "GET");

    let session = require_session(&session).await?;
    Ok(Json(service(&state)?.projects(session).await?))
}

/// POST /todoist/projects
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(body): Json<ProjectBody>,
) -> AuthResult<Json<Value>> {
    log_request_received("/todoist/projects", "POST");

    let session = require_session(&session).await?;
    Ok(Json(service(&state)?.add_project(session, &body.name).await?))
}

/// PUT /todoist/projects/:id
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<ProjectBody>,
) -> AuthResult<Json<Value>> {
    log_request_received("/todoist/projects/:id", "PUT");

    let session = require_session(&session).await?;
    Ok(Json(service(&state)?.update_project(session, &id, &body.name).await?))
}

/// DELETE /todoist/projects/:id
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> AuthResult<Json<Value>> {
    log_request_received("/todoist/projects/:id", "DELETE");

    let session = require_session(&session).await?;
    Ok(Json(service(&state)?.delete_project(session, &id).await?))
}
