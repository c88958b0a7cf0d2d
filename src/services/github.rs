use serde_json::Value;
use std::sync::Arc;

use crate::auth::OAuthFlow;
use crate::client::ProtectedRequest;
use crate::error::AuthResult;
use crate::session::SessionId;

/// Recursos protegidos da API do GitHub
#[derive(Debug, Clone)]
pub struct GitHubService {
    flow: Arc<OAuthFlow>,
}

impl GitHubService {
    pub fn new(flow: Arc<OAuthFlow>) -> Self {
        Self { flow }
    }

    /// Perfil do usuário autenticado (`GET /user`)
    pub async fn user_profile(&self, session: SessionId) -> AuthResult<Value> {
        self.flow.call(session, ProtectedRequest::get("user")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessToken, ProviderConfig, ProviderKind};
    use crate::client::build_http_client;
    use crate::error::AuthError;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_against(server: &MockServer) -> GitHubService {
        let config = ProviderConfig::new(
            ProviderKind::GitHub,
            "gh-id",
            "gh-secret",
            "http://localhost:5000/auth/github/callback",
        )
        .unwrap()
        .with_api_base_url(&server.uri())
        .unwrap();

        GitHubService::new(Arc::new(OAuthFlow::new(
            config,
            build_http_client(Duration::from_secs(5)).unwrap(),
        )))
    }

    #[tokio::test]
    async fn test_user_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer gho_profile"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "octocat",
                "id": 1
            })))
            .mount(&server)
            .await;

        let service = service_against(&server).await;
        let session = SessionId::new();
        service
            .flow
            .store()
            .put_token(session, AccessToken::new("gho_profile", "bearer"))
            .await;

        let profile = service.user_profile(session).await.unwrap();
        assert_eq!(profile["login"], "octocat");
    }

    #[tokio::test]
    async fn test_user_profile_requires_token() {
        let server = MockServer::start().await;
        let service = service_against(&server).await;

        let err = service.user_profile(SessionId::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::NoTokenPresent));
    }
}
