//! Cliente OAuth2 genérico (Authorization Code Grant)
//!
//! Um único fluxo para todos os provedores, parametrizado por [`ProviderConfig`].

use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use super::authorize::build_authorization_url;
use super::callback::{validate_callback, AuthorizationCode};
use super::provider::ProviderConfig;
use super::state::{generate_state, AuthorizationState};
use super::token::{parse_token_response, provider_error_detail, AccessToken};
use crate::error::{AuthError, AuthResult};
use crate::utils::logging::*;

/// Cliente OAuth2 de um provedor
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    config: ProviderConfig,
    http_client: Client,
}

impl OAuth2Client {
    pub fn new(config: ProviderConfig, http_client: Client) -> Self {
        Self { config, http_client }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Gera um state novo e a URL de autorização correspondente
    ///
    /// O chamador guarda o state na sessão e redireciona para a URL.
    pub fn begin_authorization(&self) -> (Url, AuthorizationState) {
        let state = generate_state();
        let url = build_authorization_url(&self.config, &state);

        log_info(&format!(
            "🚀 [OAuth2] Autorização iniciada para {} → {}",
            self.config.kind,
            self.config.authorization_endpoint
        ));

        (url, state)
    }

    /// Valida o callback e troca o código por um token
    ///
    /// Falhas de state acontecem antes de qualquer requisição ao endpoint de token.
    pub async fn complete_authorization(
        &self,
        callback_url: &str,
        stored_state: Option<&AuthorizationState>,
    ) -> AuthResult<AccessToken> {
        let code = validate_callback(callback_url, stored_state)?;
        self.exchange_code(&code).await
    }

    /// POST server-to-server no endpoint de token
    pub async fn exchange_code(&self, code: &AuthorizationCode) -> AuthResult<AccessToken> {
        log_info(&format!(
            "🔐 [OAuth2] Trocando authorization code por access token ({})...",
            self.config.kind
        ));

        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let mut request = self
            .http_client
            .post(self.config.token_endpoint.clone())
            .header(ACCEPT, "application/json");

        if self.config.include_client_id {
            params.push(("client_id", self.config.client_id.as_str()));
            params.push(("client_secret", self.config.client_secret()));
        } else {
            request = request.basic_auth(&self.config.client_id, Some(self.config.client_secret()));
        }

        let response = request.form(&params).send().await.map_err(|e| {
            log_error(&format!("❌ [OAuth2] Falha de conexão com o endpoint de token: {}", e));
            AuthError::exchange_failed(format!("falha de transporte: {}", e.without_url()))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::exchange_failed(format!("falha ao ler resposta: {}", e.without_url())))?;

        if !status.is_success() {
            let detail = provider_error_detail(&body);
            log_error(&format!(
                "❌ [OAuth2] Token exchange failed: {} - {}",
                status, detail
            ));
            return Err(AuthError::exchange_failed(detail));
        }

        let token = parse_token_response(&body).map_err(|e| {
            log_error(&format!("❌ [OAuth2] Resposta de token rejeitada: {}", e));
            e
        })?;

        log_info(&format!(
            "✅ [OAuth2] Access token obtido ({}), scope: {:?}",
            token.token_type, token.scope
        ));

        Ok(token)
    }
}
