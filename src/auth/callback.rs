//! Validação do callback de autorização
//!
//! Ordem das verificações: state presente, state igual ao emitido, ausência
//! de `error` e presença de `code`. Nenhuma chamada de rede acontece aqui.

use std::collections::HashMap;
use url::Url;

use super::state::AuthorizationState;
use crate::error::{AuthError, AuthResult};
use crate::utils::logging::*;
use crate::utils::truncate_safe;

/// Código de autorização extraído de um callback válido
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthorizationCode({}...)", truncate_safe(&self.0, 6))
    }
}

/// Parâmetros de query do callback
#[derive(Debug, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Lê os parâmetros de uma URL de callback completa ou apenas de `?query`
    pub fn from_callback_url(callback_url: &str) -> AuthResult<Self> {
        let url = match Url::parse(callback_url) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Url::parse("http://callback.invalid/")?.join(callback_url)?
            }
            Err(e) => return Err(e.into()),
        };

        let mut query: HashMap<String, String> = url.query_pairs().into_owned().collect();

        Ok(Self {
            code: query.remove("code").filter(|c| !c.is_empty()),
            state: query.remove("state"),
            error: query.remove("error"),
            error_description: query.remove("error_description"),
        })
    }
}

/// Valida o callback contra o state guardado na sessão
///
/// `stored_state = None` significa que a sessão não tem autorização em
/// andamento; qualquer callback é tratado como falha de CSRF.
pub fn validate_callback(
    callback_url: &str,
    stored_state: Option<&AuthorizationState>,
) -> AuthResult<AuthorizationCode> {
    let params = CallbackParams::from_callback_url(callback_url)?;

    let received_state = params.state.as_deref().ok_or_else(|| {
        log_warning("❌ [OAuth2] Callback sem parâmetro state");
        AuthError::MissingState
    })?;

    match stored_state {
        Some(expected) if expected.matches(received_state) => {}
        _ => {
            log_warning("🚨 [OAuth2] State do callback não confere com o emitido (CSRF)");
            return Err(AuthError::CsrfMismatch);
        }
    }

    if let Some(error) = params.error {
        let detail = match params.error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error,
        };
        log_warning(&format!("❌ [OAuth2] Provedor recusou a autorização: {}", detail));
        return Err(AuthError::AuthorizationDenied(detail));
    }

    let code = params
        .code
        .ok_or_else(|| AuthError::denied("código de autorização ausente no callback"))?;

    log_info(&format!("🔑 [OAuth2] Code recebido: {}...", truncate_safe(&code, 6)));

    Ok(AuthorizationCode(code))
}
