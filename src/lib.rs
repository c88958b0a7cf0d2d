// Biblioteca do middleware OAuth2 (GitHub / Todoist)
// Expõe módulos para uso em testes e no binário

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod session;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;

use auth::{OAuthFlow, ProviderKind};
use error::{AuthError, AuthResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub flows: HashMap<ProviderKind, Arc<OAuthFlow>>,
}

impl AppState {
    /// Cria um fluxo por provedor habilitado, todos sobre o mesmo cliente HTTP
    pub fn new(settings: config::Settings, http_client: reqwest::Client) -> Self {
        let flows = settings
            .provider_configs()
            .into_iter()
            .map(|config| OAuthFlow::new(config, http_client.clone()))
            .collect();

        Self::with_flows(settings, flows)
    }

    pub fn with_flows(settings: config::Settings, flows: Vec<OAuthFlow>) -> Self {
        let flows = flows
            .into_iter()
            .map(|flow| (flow.kind(), Arc::new(flow)))
            .collect();

        Self { settings, flows }
    }

    pub fn flow(&self, kind: ProviderKind) -> AuthResult<&Arc<OAuthFlow>> {
        self.flows
            .get(&kind)
            .ok_or_else(|| AuthError::invalid_request(format!("Provider '{}' não habilitado", kind)))
    }

    pub fn is_enabled(&self, kind: ProviderKind) -> bool {
        self.flows.contains_key(&kind)
    }
}
