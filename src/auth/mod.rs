//! # OAuth2 Authorization Code Grant
//!
//! Fluxo genérico para todos os provedores suportados; as diferenças entre
//! provedores vivem em [`provider::ProviderProfile`].
//!
//! ## Estrutura:
//! - `state.rs`: geração do parâmetro `state`
//! - `provider.rs`: perfis e configuração de provedores
//! - `authorize.rs`: URL de autorização
//! - `callback.rs`: validação do callback
//! - `token.rs`: access token e parsing da resposta de token
//! - `client.rs`: início do fluxo e troca de código
//! - `flow.rs`: fluxo completo amarrado a uma sessão

pub mod authorize;
pub mod callback;
pub mod client;
pub mod flow;
pub mod provider;
pub mod state;
pub mod token;

pub use authorize::build_authorization_url;
pub use callback::{validate_callback, AuthorizationCode, CallbackParams};
pub use client::OAuth2Client;
pub use flow::OAuthFlow;
pub use provider::{ProviderConfig, ProviderKind, ProviderProfile, ScopeDelimiter};
pub use state::{generate_state, AuthorizationState};
pub use token::{AccessToken, TokenSummary};
