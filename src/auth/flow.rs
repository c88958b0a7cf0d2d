//! Fluxo OAuth2 por sessão
//!
//! Liga o [`OAuth2Client`], o [`ApiClient`] e o [`SessionStore`] de um provedor.

use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::client::OAuth2Client;
use super::provider::{ProviderConfig, ProviderKind};
use super::token::TokenSummary;
use crate::client::{ApiClient, ProtectedRequest};
use crate::error::AuthResult;
use crate::session::{SessionId, SessionPhase, SessionStore};
use crate::utils::logging::*;

#[derive(Debug, Clone)]
pub struct OAuthFlow {
    client: OAuth2Client,
    api: ApiClient,
    store: SessionStore,
}

impl OAuthFlow {
    pub fn new(config: ProviderConfig, http_client: reqwest::Client) -> Self {
        let api = ApiClient::new(&config, http_client.clone());
        Self {
            client: OAuth2Client::new(config, http_client),
            api,
            store: SessionStore::new(),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.client.config().kind
    }

    pub fn config(&self) -> &ProviderConfig {
        self.client.config()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Emite um state para a sessão e devolve a URL de autorização
    pub async fn begin(&self, session: SessionId) -> Url {
        let (url, state) = self.client.begin_authorization();
        self.store.put_state(session, state).await;
        url
    }

    /// Consome o state pendente, valida o callback e guarda o token obtido
    ///
    /// Em qualquer falha o token anterior da sessão permanece intacto.
    pub async fn complete(&self, session: SessionId, callback_url: &str) -> AuthResult<TokenSummary> {
        let stored = self.store.take_state(session).await;

        let token = match self
            .client
            .complete_authorization(callback_url, stored.as_ref())
            .await
        {
            Ok(token) => token,
            Err(e) => {
                log_warning(&format!(
                    "⚠️ [OAuth2] Autorização {} falhou na sessão {}: {}",
                    self.kind(),
                    session,
                    e.kind()
                ));
                return Err(e);
            }
        };

        let summary = token.summary();
        self.store.put_token(session, token).await;

        log_info(&format!(
            "✅ [OAuth2] Sessão {} autenticada em {}",
            session,
            self.kind()
        ));

        Ok(summary)
    }

    /// Chamada autenticada usando o token da sessão
    pub async fn call(&self, session: SessionId, request: ProtectedRequest) -> AuthResult<Value> {
        let token = self.store.get_token(session).await?;
        self.api.call_protected_resource(&token, request).await
    }

    pub async fn phase(&self, session: SessionId) -> SessionPhase {
        self.store.phase(session).await
    }

    /// Resumo do token atual, sem o valor do token
    pub async fn token_summary(&self, session: SessionId) -> Option<TokenSummary> {
        self.store.get_token(session).await.ok().map(|t| t.summary())
    }

    pub async fn logout(&self, session: SessionId) -> bool {
        self.store.end_session(session).await
    }

    pub async fn purge_expired(&self, ttl: Duration) -> usize {
        self.store.purge_expired(ttl).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::build_http_client;
    use crate::error::AuthError;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn flow_against(server: &MockServer) -> OAuthFlow {
        let config = ProviderConfig::new(
            ProviderKind::GitHub,
            "gh-id",
            "gh-secret",
            "http://localhost:5000/auth/github/callback",
        )
        .unwrap()
        .with_auth_base_url(&server.uri())
        .unwrap()
        .with_api_base_url(&server.uri())
        .unwrap();

        OAuthFlow::new(config, build_http_client(Duration::from_secs(5)).unwrap())
    }

    fn state_of(url: &Url) -> String {
        url.query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_flow_then_protected_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/oauth/access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_flow",
                "token_type": "bearer",
                "scope": ""
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_flow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"login": "octocat"})))
            .mount(&server)
            .await;

        let flow = flow_against(&server).await;
        let session = SessionId::new();

        let url = flow.begin(session).await;
        assert_eq!(flow.phase(session).await, SessionPhase::AwaitingCallback);

        let callback = format!("?code=c0de&state={}", state_of(&url));
        flow.complete(session, &callback).await.unwrap();
        assert_eq!(flow.phase(session).await, SessionPhase::Authenticated);

        let user = flow.call(session, ProtectedRequest::get("user")).await.unwrap();
        assert_eq!(user["login"], "octocat");
    }

    #[tokio::test]
    async fn test_state_is_single_use() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "gho_once",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let flow = flow_against(&server).await;
        let session = SessionId::new();
        let url = flow.begin(session).await;
        let callback = format!("?code=c0de&state={}", state_of(&url));

        assert!(flow.complete(session, &callback).await.is_ok());
        assert!(matches!(
            flow.complete(session, &callback).await.unwrap_err(),
            AuthError::CsrfMismatch
        ));
    }

    #[tokio::test]
    async fn test_failed_reauthorization_keeps_token() {
        let server = MockServer::start().await;
        let flow = flow_against(&server).await;
        let session = SessionId::new();

        flow.store()
            .put_token(session, crate::auth::token::AccessToken::new("old", "Bearer"))
            .await;
        flow.begin(session).await;

        let err = flow
            .complete(session, "?code=c0de&state=forged")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::CsrfMismatch));
        assert_eq!(flow.store().get_token(session).await.unwrap().secret(), "old");
    }

    #[tokio::test]
    async fn test_call_without_token() {
        let server = MockServer::start().await;
        let flow = flow_against(&server).await;

        let err = flow
            .call(SessionId::new(), ProtectedRequest::get("user"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::NoTokenPresent));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
