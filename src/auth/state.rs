//! Geração do parâmetro `state` (proteção CSRF)
//!
//! Cada tentativa de autorização recebe um valor novo, guardado na sessão
//! até o callback chegar e então consumido.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bytes aleatórios por state (256 bits)
const STATE_BYTES: usize = 32;

/// Valor opaco que amarra uma requisição de autorização ao seu callback
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState(String);

impl AuthorizationState {
    /// Envolve um valor já existente (ex: recuperado de armazenamento)
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Comparação exata com o state recebido no callback
    pub fn matches(&self, received: &str) -> bool {
        self.0 == received
    }
}

impl fmt::Debug for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationState({}...)", crate::utils::truncate_safe(&self.0, 6))
    }
}

impl fmt::Display for AuthorizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gera um state criptograficamente aleatório, codificado em base64 URL-safe
pub fn generate_state() -> AuthorizationState {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    AuthorizationState(URL_SAFE_NO_PAD.encode(bytes))
}
