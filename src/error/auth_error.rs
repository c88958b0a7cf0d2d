use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Erros do fluxo OAuth2 (Authorization Code Grant) e das chamadas autenticadas
///
/// Nenhuma variante carrega o client secret ou o access token em texto puro.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Parâmetro state ausente no callback")]
    MissingState,

    #[error("Estado OAuth2 não confere com o emitido para esta sessão")]
    CsrfMismatch,

    #[error("Autorização negada pelo provedor: {0}")]
    AuthorizationDenied(String),

    #[error("Falha ao trocar código por token: {0}")]
    TokenExchangeFailed(String),

    #[error("Nenhum token de acesso armazenado para esta sessão")]
    NoTokenPresent,

    #[error("Token rejeitado pelo provedor: {0}")]
    Unauthorized(String),

    #[error("Erro do provedor{}: {message}", .status.map(|s| format!(" [{}]", s)).unwrap_or_default())]
    ProviderError {
        status: Option<u16>,
        message: String,
    },

    #[error("Erro de transporte: {0}")]
    TransportError(String),

    #[error("Configuração inválida: {0}")]
    ConfigError(String),

    #[error("URL inválida: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Requisição inválida: {0}")]
    InvalidRequest(String),

    #[error("Falha na sessão: {0}")]
    SessionError(String),
}

impl AuthError {
    pub fn denied(msg: impl Into<String>) -> Self {
        Self::AuthorizationDenied(msg.into())
    }

    pub fn exchange_failed(msg: impl Into<String>) -> Self {
        Self::TokenExchangeFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn provider_error(status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::ProviderError {
            status,
            message: msg.into(),
        }
    }

    /// Mensagem exibível ao usuário final, agrupada por tipo de falha
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::AuthorizationDenied(_) => {
                "You denied access to your account. Start the authorization again to continue."
            }
            AuthError::MissingState | AuthError::CsrfMismatch => {
                "Security check failed, please retry the authorization."
            }
            AuthError::NoTokenPresent | AuthError::Unauthorized(_) => {
                "You are not connected to this service. Please authorize again."
            }
            AuthError::TokenExchangeFailed(_)
            | AuthError::ProviderError { .. }
            | AuthError::TransportError(_) => "The service is currently unavailable. Please try again later.",
            AuthError::ConfigError(_) | AuthError::InvalidUrl(_) => {
                "The service is not configured correctly."
            }
            AuthError::InvalidRequest(_) => "The request is invalid.",
            AuthError::SessionError(_) => "Your session could not be loaded. Please try again.",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingState | AuthError::CsrfMismatch | AuthError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
            AuthError::NoTokenPresent | AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::TokenExchangeFailed(_)
            | AuthError::ProviderError { .. }
            | AuthError::TransportError(_) => StatusCode::BAD_GATEWAY,
            AuthError::ConfigError(_) | AuthError::InvalidUrl(_) | AuthError::SessionError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Código estável usado no corpo JSON das respostas de erro
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingState => "missing_state",
            AuthError::CsrfMismatch => "csrf_mismatch",
            AuthError::AuthorizationDenied(_) => "authorization_denied",
            AuthError::TokenExchangeFailed(_) => "token_exchange_failed",
            AuthError::NoTokenPresent => "no_token_present",
            AuthError::Unauthorized(_) => "unauthorized",
            AuthError::ProviderError { .. } => "provider_error",
            AuthError::TransportError(_) => "transport_error",
            AuthError::ConfigError(_) => "config_error",
            AuthError::InvalidUrl(_) => "invalid_url",
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::SessionError(_) => "session_error",
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        // sem URL: a query de algumas chamadas pode carregar parâmetros sensíveis
        AuthError::TransportError(err.without_url().to_string())
    }
}

impl From<tower_sessions::session::Error> for AuthError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AuthError::SessionError(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": self.kind(),
            "message": self.user_message(),
            "detail": self.to_string(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Tipo de resultado padrão para operações de autenticação
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        assert_eq!(
            AuthError::MissingState.to_string(),
            "Parâmetro state ausente no callback"
        );
        assert_eq!(
            AuthError::exchange_failed("invalid_grant").to_string(),
            "Falha ao trocar código por token: invalid_grant"
        );
        assert_eq!(
            AuthError::provider_error(Some(500), "boom").to_string(),
            "Erro do provedor [500]: boom"
        );
        assert_eq!(
            AuthError::provider_error(None, "corpo inválido").to_string(),
            "Erro do provedor: corpo inválido"
        );
    }

    #[test]
    fn test_user_messages_distinguish_failure_classes() {
        let denied = AuthError::denied("access_denied").user_message();
        let csrf = AuthError::CsrfMismatch.user_message();
        let unavailable = AuthError::TransportError("timeout".into()).user_message();

        assert!(denied.contains("denied"));
        assert!(csrf.contains("Security check failed"));
        assert!(unavailable.contains("unavailable"));
        assert_eq!(AuthError::MissingState.user_message(), csrf);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::CsrfMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::denied("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NoTokenPresent.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::exchange_failed("x").status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_url_parse_error_from() {
        let url_error = url::Url::parse("not-a-valid-url").unwrap_err();
        let auth_error = AuthError::from(url_error);
        assert!(matches!(auth_error, AuthError::InvalidUrl(_)));
        assert!(auth_error.to_string().contains("URL inválida"));
    }
}
