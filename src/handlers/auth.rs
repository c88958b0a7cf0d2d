//! Handlers do fluxo OAuth2
//!
//! `GET /auth/:provider` → provedor → `GET /auth/:provider/callback` → status.

use axum::{
    extract::{Path, RawQuery, State},
    response::{Json, Redirect},
    Extension,
};
use serde_json::json;
use std::sync::Arc;
use tower_sessions::Session;
use url::Url;

use crate::auth::ProviderKind;
use crate::error::AuthResult;
use crate::session::{current_session, ensure_session, rotate_session, SessionPhase};
use crate::utils::logging::*;
use crate::AppState;

/// GET /auth/:provider
///
/// Emite um state novo para a sessão e redireciona (303) para o provedor.
pub async fn begin_authorization(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Extension(session): Extension<Session>,
) -> AuthResult<Redirect> {
    log_request_received(&format!("/auth/{}", provider), "GET");

    let kind: ProviderKind = provider.parse()?;
    let flow = state.flow(kind)?;

    flow.purge_expired(state.settings.session_ttl()).await;

    let session_id = ensure_session(&session).await?;
    let url = flow.begin(session_id).await;

    log_info(&format!(
        "↗️  [OAuth2] Redirecionando sessão {} para {}",
        session_id,
        flow.config().authorization_endpoint
    ));

    Ok(Redirect::to(url.as_str()))
}

/// GET /auth/:provider/callback?code=...&state=...
pub async fn handle_callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Extension(session): Extension<Session>,
    RawQuery(query): RawQuery,
) -> AuthResult<Redirect> {
    log_request_received(&format!("/auth/{}/callback", provider), "GET");

    let kind: ProviderKind = provider.parse()?;
    let flow = state.flow(kind)?;

    // sem sessão não há state emitido: a validação falha como CSRF
    let session_id = current_session(&session).await?.unwrap_or_default();
    let url = callback_url(&flow.config().redirect_uri, query.as_deref())?;

    flow.complete(session_id, url.as_str()).await?;
    rotate_session(&session).await?;

    Ok(Redirect::to(&format!("/auth/{}/status", kind)))
}

/// URL de callback com a query exatamente como o provedor enviou
///
/// A query do `redirect_uri` configurado é substituída, não concatenada.
pub(crate) fn callback_url(redirect_uri: &str, query: Option<&str>) -> AuthResult<Url> {
    let mut url = Url::parse(redirect_uri)?;
    url.set_query(query);
    Ok(url)
}

/// GET /auth/:provider/status
///
/// Fase da sessão e resumo do token; o valor do token nunca é exposto.
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Extension(session): Extension<Session>,
) -> AuthResult<Json<serde_json::Value>> {
    let kind: ProviderKind = provider.parse()?;
    let flow = state.flow(kind)?;

    let (phase, token) = match current_session(&session).await? {
        Some(id) => (flow.phase(id).await, flow.token_summary(id).await),
        None => (SessionPhase::Unauthenticated, None),
    };

    Ok(Json(json!({
        "provider": kind,
        "phase": phase,
        "token": token
    })))
}

/// POST /auth/:provider/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Extension(session): Extension<Session>,
) -> AuthResult<Json<serde_json::Value>> {
    let kind: ProviderKind = provider.parse()?;
    let flow = state.flow(kind)?;

    let logged_out = match current_session(&session).await? {
        Some(id) => flow.logout(id).await,
        None => false,
    };

    if logged_out {
        log_info(&format!("👋 [OAuth2] Sessão encerrada em {}", kind));
    }

    Ok(Json(json!({
        "provider": kind,
        "logged_out": logged_out
    })))
}
