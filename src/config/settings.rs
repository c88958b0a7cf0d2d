use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use std::time::Duration;

use crate::auth::provider::{ProviderConfig, ProviderKind};
use crate::utils::logging::*;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub session: SessionSettings,
    pub github: Option<ProviderSettings>,
    pub todoist: Option<ProviderSettings>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionSettings {
    pub ttl_seconds: u64,
    pub cookie_name: String,
    /// Atributo `Secure` do cookie; ligar em produção (HTTPS)
    #[serde(default)]
    pub secure: bool,
}

impl SessionSettings {
    /// Nome do cookie precisa ser um token RFC 6265 não vazio
    fn validate(&self) -> Result<(), ConfigError> {
        let valid = !self.cookie_name.is_empty()
            && self.cookie_name.bytes().all(|b| {
                b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
            });

        if valid {
            Ok(())
        } else {
            Err(ConfigError::Message(format!(
                "session.cookie_name inválido: {:?}",
                self.cookie_name
            )))
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_seconds: 30 }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 86_400,
            cookie_name: crate::session::DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
        }
    }
}

/// Credenciais e overrides de um provedor
///
/// Campos ausentes deixam o perfil padrão do provedor valer.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ProviderSettings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub scopes: Option<Vec<String>>,
    pub auth_base_url: Option<String>,
    pub api_base_url: Option<String>,
}

impl ProviderSettings {
    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("auth_base_url", &self.auth_base_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load("config")
    }

    /// Carrega `{dir}/default`, `{dir}/{RUN_MODE}` e as variáveis de ambiente
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("http.timeout_seconds", defaults.http.timeout_seconds)?
            .set_default("session.ttl_seconds", defaults.session.ttl_seconds)?
            .set_default("session.cookie_name", defaults.session.cookie_name)?
            .set_default("session.secure", defaults.session.secure)?
            // Arquivo de configuração base
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(
                Environment::with_prefix("OAUTH_FLOW")
                    .separator("__")
                    .try_parsing(true),
            );

        // Nomes usuais das credenciais têm prioridade
        for (key, var) in [
            ("github.client_id", "GITHUB_CLIENT_ID"),
            ("github.client_secret", "GITHUB_CLIENT_SECRET"),
            ("todoist.client_id", "TODOIST_CLIENT_ID"),
            ("todoist.client_secret", "TODOIST_CLIENT_SECRET"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        // Cloud Run / Heroku
        if let Ok(port) = std::env::var("PORT") {
            let port: i64 = port
                .parse()
                .map_err(|_| ConfigError::Message(format!("PORT inválida: {}", port)))?;
            builder = builder.set_override("server.port", port)?;
        }

        let s = builder.build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.session.validate()?;

        Ok(settings)
    }

    pub fn provider(&self, kind: ProviderKind) -> Option<&ProviderSettings> {
        match kind {
            ProviderKind::GitHub => self.github.as_ref(),
            ProviderKind::Todoist => self.todoist.as_ref(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.ttl_seconds)
    }

    /// Configurações dos provedores habilitados
    ///
    /// Provedor sem credenciais ou com configuração inválida fica desabilitado.
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        ProviderKind::ALL
            .iter()
            .filter_map(|&kind| {
                let settings = match self.provider(kind) {
                    Some(s) if s.has_credentials() => s,
                    _ => {
                        log_provider_disabled(kind.as_str(), "client_id/client_secret ausentes");
                        return None;
                    }
                };

                match ProviderConfig::from_settings(kind, settings) {
                    Ok(config) => {
                        log_provider_enabled(kind.as_str(), &config.client_id, &config.scopes);
                        Some(config)
                    }
                    Err(e) => {
                        log_provider_disabled(kind.as_str(), &e.to_string());
                        None
                    }
                }
            })
            .collect()
    }
}
