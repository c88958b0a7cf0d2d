// Handlers HTTP: fluxo OAuth2 e recursos protegidos por provedor
pub mod auth;
pub mod github;
pub mod health;
pub mod todoist;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::auth::ProviderKind;
use crate::error::{AuthError, AuthResult};
use crate::session::{current_session, session_layer, SessionId};
use crate::utils::logging::*;
use crate::AppState;

pub use health::health_check;

/// Rotas protegidas exigem sessão; sem ela não existe token
pub(crate) async fn require_session(session: &Session) -> AuthResult<SessionId> {
    current_session(session).await?.ok_or(AuthError::NoTokenPresent)
}

/// Router completo; rotas de recursos só existem para provedores habilitados
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/auth/:provider", get(auth::begin_authorization))
        .route("/auth/:provider/callback", get(auth::handle_callback))
        .route("/auth/:provider/status", get(auth::session_status))
        .route("/auth/:provider/logout", post(auth::logout));

    if state.is_enabled(ProviderKind::GitHub) {
        log_info("✅ GitHub endpoints enabled: /github/profile");
        app = app.route("/github/profile", get(github::user_profile));
    }

    if state.is_enabled(ProviderKind::Todoist) {
        log_info("✅ Todoist endpoints enabled: /todoist/resources, /todoist/projects");
        app = app
            .route("/todoist/resources", get(todoist::list_resources))
            .route(
                "/todoist/projects",
                get(todoist::list_projects).post(todoist::create_project),
            )
            .route(
                "/todoist/projects/:id",
                put(todoist::update_project).delete(todoist::delete_project),
            );
    }

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(session_layer(&state.settings.session));

    app.layer(middleware).with_state(state)
}
