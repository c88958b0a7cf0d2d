//! Armazenamento de sessão OAuth2
//!
//! Tabela explícita `SessionId → entrada`, sem estado global. Cada entrada
//! guarda o state pendente (no máximo um) e o token atual (no máximo um).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::state::AuthorizationState;
use crate::auth::token::AccessToken;
use crate::error::{AuthError, AuthResult};
use crate::utils::logging::*;

/// Identificador opaco de sessão (UUID v4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Fase do fluxo OAuth2 de uma sessão
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Unauthenticated,
    AwaitingCallback,
    Authenticated,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    pending_state: Option<AuthorizationState>,
    token: Option<AccessToken>,
    touched_at: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            pending_state: None,
            token: None,
            touched_at: Instant::now(),
        }
    }

    fn touch(&mut self) -> &mut Self {
        self.touched_at = Instant::now();
        self
    }

    fn is_empty(&self) -> bool {
        self.pending_state.is_none() && self.token.is_none()
    }
}

/// Tabela de sessões de um provedor
///
/// Clonar compartilha a mesma tabela.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guarda o state emitido; um state anterior da mesma sessão é descartado
    pub async fn put_state(&self, session: SessionId, state: AuthorizationState) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session).or_insert_with(SessionEntry::new);

        if entry.pending_state.is_some() {
            log_info(&format!(
                "🔁 [Session] Nova autorização na sessão {} substitui o state anterior",
                session
            ));
        }

        entry.touch().pending_state = Some(state);
    }

    /// Remove e devolve o state pendente (uso único)
    pub async fn take_state(&self, session: SessionId) -> Option<AuthorizationState> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(&session)
            .and_then(|entry| entry.touch().pending_state.take())
    }

    /// Guarda o token da sessão, sobrescrevendo qualquer token anterior
    pub async fn put_token(&self, session: SessionId, token: AccessToken) {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(session).or_insert_with(SessionEntry::new);
        entry.touch().token = Some(token);
    }

    /// Token atual da sessão, ou `NoTokenPresent`
    pub async fn get_token(&self, session: SessionId) -> AuthResult<AccessToken> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(&session)
            .and_then(|entry| entry.touch().token.clone())
            .ok_or(AuthError::NoTokenPresent)
    }

    pub async fn phase(&self, session: SessionId) -> SessionPhase {
        let sessions = self.sessions.read().await;
        match sessions.get(&session) {
            Some(entry) if entry.pending_state.is_some() => SessionPhase::AwaitingCallback,
            Some(entry) if entry.token.is_some() => SessionPhase::Authenticated,
            _ => SessionPhase::Unauthenticated,
        }
    }

    /// Encerra a sessão (logout); devolve `true` se havia algo guardado
    pub async fn end_session(&self, session: SessionId) -> bool {
        let removed = self.sessions.write().await.remove(&session);
        removed.map(|entry| !entry.is_empty()).unwrap_or(false)
    }

    /// Remove sessões sem atividade há mais de `ttl`
    pub async fn purge_expired(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.touched_at.elapsed() < ttl);
        let purged = before - sessions.len();

        if purged > 0 {
            log_info(&format!("🗑️  [Session] {} sessões expiradas removidas", purged));
        }

        purged
    }
}
