use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::auth::provider::ProviderConfig;
use crate::auth::token::{provider_error_detail, AccessToken};
use crate::error::{AuthError, AuthResult};
use crate::utils::logging::*;

/// Corpo de uma requisição protegida
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
}

/// Chamada de saída que exige um access token
///
/// `endpoint` pode ser absoluto ou relativo à base da API do provedor.
#[derive(Debug, Clone)]
pub struct ProtectedRequest {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<RequestBody>,
}

impl ProtectedRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post_form<I, K, V>(endpoint: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(Method::POST, endpoint).with_body(RequestBody::Form(fields))
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Cliente HTTP compartilhado, com timeout de transporte
pub fn build_http_client(timeout: Duration) -> AuthResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AuthError::config_error(format!("Falha ao criar cliente HTTP: {}", e)))
}

/// Cliente das APIs protegidas de um provedor
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    api_base_url: Url,
    token_form_field: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ProviderConfig, http_client: Client) -> Self {
        Self {
            http_client,
            api_base_url: config.api_base_url.clone(),
            token_form_field: config.token_form_field.clone(),
        }
    }

    fn build_url(&self, endpoint: &str) -> AuthResult<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Url::parse(endpoint)?);
        }
        Ok(self.api_base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Executa a requisição com o token anexado e devolve o JSON da resposta
    ///
    /// O token vai sempre no header `Authorization`; provedores com
    /// `token_form_field` também o recebem como campo do formulário.
    pub async fn call_protected_resource(
        &self,
        token: &AccessToken,
        request: ProtectedRequest,
    ) -> AuthResult<Value> {
        let url = self.build_url(&request.endpoint)?;

        log_info(&format!("📤 [API] {} {}", request.method, url.path()));

        let mut builder = self
            .http_client
            .request(request.method.clone(), url.clone())
            .header(AUTHORIZATION, token.authorization_header())
            .header(ACCEPT, "application/json");

        builder = match request.body {
            Some(RequestBody::Form(mut fields)) => {
                if let Some(field) = &self.token_form_field {
                    if !fields.iter().any(|(k, _)| k == field) {
                        fields.push((field.clone(), token.secret().to_string()));
                    }
                }
                builder.form(&fields)
            }
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                log_error(&format!("⏱️ [API] Timeout em {}", url.path()));
                AuthError::TransportError(format!("timeout ao chamar {}", url.path()))
            } else {
                log_error(&format!("❌ [API] Falha de conexão em {}: {}", url.path(), e));
                AuthError::from(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log_provider_api_error(url.path(), Some(status.as_u16()), &provider_error_detail(&body));
            return Err(Self::handle_error_response(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            AuthError::provider_error(Some(status.as_u16()), format!("JSON inválido na resposta: {}", e))
        })
    }

    fn handle_error_response(status: u16, body: &str) -> AuthError {
        let detail = provider_error_detail(body);
        match status {
            // 403 com token válido: escopo insuficiente ou rate limit
            401 => AuthError::Unauthorized(detail),
            _ => AuthError::provider_error(Some(status), detail),
        }
    }
}
