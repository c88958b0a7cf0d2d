//! Camada de sessão por cookie
//!
//! O cookie carrega só o id opaco do tower-sessions; o [`SessionId`] do fluxo
//! fica no servidor, dentro da sessão.

use time::Duration;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, Session, SessionManagerLayer};
use tower_sessions_memory_store::MemoryStore;

use super::store::SessionId;
use crate::config::SessionSettings;
use crate::error::AuthResult;

pub const DEFAULT_COOKIE_NAME: &str = "oauth_sid";

const SESSION_ID_KEY: &str = "oauth.session_id";

/// `SessionManagerLayer` em memória com os atributos do cookie configurados
///
/// `SameSite=Lax` mantém o cookie no redirect de volta do provedor.
pub fn session_layer(settings: &SessionSettings) -> SessionManagerLayer<MemoryStore> {
    let ttl = i64::try_from(settings.ttl_seconds).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(settings.cookie_name.clone())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(ttl)))
        .with_secure(settings.secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_path("/")
}

/// SessionId já associado ao cookie, se houver
pub async fn current_session(session: &Session) -> AuthResult<Option<SessionId>> {
    Ok(session.get::<SessionId>(SESSION_ID_KEY).await?)
}

/// SessionId do cookie, criando um novo na primeira visita
pub async fn ensure_session(session: &Session) -> AuthResult<SessionId> {
    if let Some(id) = current_session(session).await? {
        return Ok(id);
    }

    let id = SessionId::new();
    session.insert(SESSION_ID_KEY, id).await?;
    Ok(id)
}

/// Troca o id do cookie mantendo os dados; chamado após autenticar
pub async fn rotate_session(session: &Session) -> AuthResult<()> {
    session.cycle_id().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn detached_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_ensure_session_is_stable() {
        let session = detached_session();

        assert!(current_session(&session).await.unwrap().is_none());

        let first = ensure_session(&session).await.unwrap();
        let second = ensure_session(&session).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(current_session(&session).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_rotation_keeps_session_id() {
        let session = detached_session();
        let id = ensure_session(&session).await.unwrap();

        rotate_session(&session).await.unwrap();

        assert_eq!(current_session(&session).await.unwrap(), Some(id));
    }
}
