use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::{AuthError, AuthResult};
use crate::utils::truncate_with_ellipsis;

/// Token de acesso OAuth2 obtido na troca do código
///
/// O valor do token só sai daqui por [`AccessToken::secret`] e
/// [`AccessToken::authorization_header`]; `Debug` e [`TokenSummary`] nunca o mostram.
#[derive(Clone)]
pub struct AccessToken {
    access_token: String,
    pub token_type: String,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    refresh_token: Option<String>,
    pub obtained_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            scope: None,
            expires_in: None,
            refresh_token: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_expires_in(mut self, expires_in: u64) -> Self {
        self.expires_in = Some(expires_in);
        self
    }

    pub fn secret(&self) -> &str {
        &self.access_token
    }

    /// Valor do header `Authorization`
    ///
    /// GitHub devolve `token_type=bearer` em minúsculas; o esquema enviado é sempre `Bearer`.
    pub fn authorization_header(&self) -> String {
        let scheme = if self.token_type.is_empty() || self.token_type.eq_ignore_ascii_case("bearer") {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", scheme, self.access_token)
    }

    /// `None` sem `expires_in` ou quando o valor não cabe numa data
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.expires_in?).ok()?;
        self.obtained_at.checked_add_signed(Duration::try_seconds(secs)?)
    }

    /// Metadado informativo; o armazenamento de tokens não aplica expiração
    pub fn is_expired(&self) -> bool {
        self.expires_at().map(|at| Utc::now() >= at).unwrap_or(false)
    }

    pub fn summary(&self) -> TokenSummary {
        TokenSummary {
            token_type: self.token_type.clone(),
            scope: self.scope.clone(),
            obtained_at: self.obtained_at,
            expires_at: self.expires_at(),
            has_refresh_token: self.refresh_token.is_some(),
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Visão segura do token para respostas HTTP e logs
#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub token_type: String,
    pub scope: Option<String>,
    pub obtained_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub has_refresh_token: bool,
}

/// Lê o corpo da resposta do endpoint de token, em JSON ou form-urlencoded
fn response_fields(body: &str) -> Option<HashMap<String, String>> {
    let trimmed = body.trim();

    if trimmed.starts_with('{') {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(trimmed).ok()?;
        let fields = map
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some((key, s)),
                other => Some((key, other.to_string())),
            })
            .collect();
        return Some(fields);
    }

    let fields: HashMap<String, String> = url::form_urlencoded::parse(trimmed.as_bytes())
        .into_owned()
        .collect();

    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn describe_error(fields: &HashMap<String, String>) -> Option<String> {
    let error = fields.get("error")?;
    match fields.get("error_description") {
        Some(description) if !description.is_empty() => Some(format!("{}: {}", error, description)),
        _ => Some(error.clone()),
    }
}

/// Extrai o detalhe de erro devolvido pelo provedor (`error` / `error_description`)
///
/// Sem esses campos, devolve o corpo truncado.
pub fn provider_error_detail(body: &str) -> String {
    response_fields(body)
        .as_ref()
        .and_then(describe_error)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "resposta vazia".to_string()
            } else {
                truncate_with_ellipsis(body.trim(), 200)
            }
        })
}

/// Converte uma resposta 2xx do endpoint de token em [`AccessToken`]
///
/// GitHub responde 200 com `error` no corpo quando o código é inválido;
/// isso também vira `TokenExchangeFailed`.
pub fn parse_token_response(body: &str) -> AuthResult<AccessToken> {
    let mut fields = response_fields(body)
        .ok_or_else(|| AuthError::exchange_failed("resposta do endpoint de token malformada"))?;

    if let Some(detail) = describe_error(&fields) {
        return Err(AuthError::exchange_failed(detail));
    }

    let access_token = fields
        .remove("access_token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::exchange_failed("resposta sem access_token"))?;

    let token_type = fields
        .remove("token_type")
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Bearer".to_string());

    let expires_in = match fields.remove("expires_in") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
            AuthError::exchange_failed(format!("expires_in inválido: {}", raw))
        })?),
        None => None,
    };

    Ok(AccessToken {
        access_token,
        token_type,
        scope: fields.remove("scope"),
        expires_in,
        refresh_token: fields.remove("refresh_token"),
        obtained_at: Utc::now(),
    })
}
