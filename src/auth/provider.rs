//! Perfis de provedor OAuth2
//!
//! Um único cliente OAuth2 genérico é parametrizado por um [`ProviderConfig`].
//! As diferenças entre GitHub e Todoist (endpoints, delimitador de scopes,
//! forma de autenticar o client na troca do código) são dados, não código.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::config::ProviderSettings;
use crate::error::{AuthError, AuthResult};

/// Provedores suportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    GitHub,
    Todoist,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::GitHub, ProviderKind::Todoist];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitHub => "github",
            ProviderKind::Todoist => "todoist",
        }
    }

    pub fn profile(&self) -> &'static ProviderProfile {
        match self {
            ProviderKind::GitHub => &GITHUB_PROFILE,
            ProviderKind::Todoist => &TODOIST_PROFILE,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(ProviderKind::GitHub),
            "todoist" => Ok(ProviderKind::Todoist),
            other => Err(AuthError::invalid_request(format!("Provider desconhecido: {}", other))),
        }
    }
}

/// Como a lista de scopes é serializada no parâmetro `scope`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeDelimiter {
    Comma,
    Space,
}

impl ScopeDelimiter {
    pub fn join(&self, scopes: &[String]) -> String {
        match self {
            ScopeDelimiter::Comma => scopes.join(","),
            ScopeDelimiter::Space => scopes.join(" "),
        }
    }
}

/// Constantes fixas de cada provedor
#[derive(Debug)]
pub struct ProviderProfile {
    pub kind: ProviderKind,
    pub auth_base_url: &'static str,
    pub authorize_path: &'static str,
    pub token_path: &'static str,
    pub api_base_url: &'static str,
    pub default_scopes: &'static [&'static str],
    pub scope_delimiter: ScopeDelimiter,
    /// `true`: client_id e client_secret vão no corpo da troca do código.
    /// `false`: credenciais via HTTP Basic, client_id fora do corpo.
    pub include_client_id: bool,
    /// Campo de formulário que também carrega o token nas chamadas protegidas
    pub token_form_field: Option<&'static str>,
}

pub static GITHUB_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::GitHub,
    auth_base_url: "https://github.com",
    authorize_path: "/login/oauth/authorize",
    token_path: "/login/oauth/access_token",
    api_base_url: "https://api.github.com",
    default_scopes: &[],
    scope_delimiter: ScopeDelimiter::Space,
    include_client_id: false,
    token_form_field: None,
};

pub static TODOIST_PROFILE: ProviderProfile = ProviderProfile {
    kind: ProviderKind::Todoist,
    auth_base_url: "https://todoist.com",
    authorize_path: "/oauth/authorize",
    token_path: "/oauth/access_token",
    api_base_url: "https://api.todoist.com",
    default_scopes: &[
        "task:add",
        "data:read",
        "data:read_write",
        "data:delete",
        "project:delete",
    ],
    scope_delimiter: ScopeDelimiter::Comma,
    include_client_id: true,
    token_form_field: Some("token"),
};

/// Configuração imutável de um provedor, carregada uma vez no startup
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub client_id: String,
    client_secret: String,
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub api_base_url: Url,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub scope_delimiter: ScopeDelimiter,
    pub include_client_id: bool,
    pub token_form_field: Option<String>,
}

impl ProviderConfig {
    /// Cria a configuração a partir do perfil padrão do provedor
    pub fn new(
        kind: ProviderKind,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> AuthResult<Self> {
        let profile = kind.profile();
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let redirect_uri = redirect_uri.into();

        if client_id.trim().is_empty() {
            return Err(AuthError::config_error(format!("client_id vazio para {}", kind)));
        }
        if client_secret.trim().is_empty() {
            return Err(AuthError::config_error(format!("client_secret vazio para {}", kind)));
        }
        Url::parse(&redirect_uri)?;

        let auth_base = Url::parse(profile.auth_base_url)?;

        Ok(Self {
            kind,
            client_id,
            client_secret,
            authorization_endpoint: auth_base.join(profile.authorize_path)?,
            token_endpoint: auth_base.join(profile.token_path)?,
            api_base_url: base_with_trailing_slash(profile.api_base_url)?,
            redirect_uri,
            scopes: profile.default_scopes.iter().map(|s| s.to_string()).collect(),
            scope_delimiter: profile.scope_delimiter,
            include_client_id: profile.include_client_id,
            token_form_field: profile.token_form_field.map(str::to_string),
        })
    }

    /// Monta a configuração a partir das settings carregadas do ambiente
    pub fn from_settings(kind: ProviderKind, settings: &ProviderSettings) -> AuthResult<Self> {
        let redirect_uri = settings
            .redirect_uri
            .clone()
            .unwrap_or_else(|| default_redirect_uri(kind));

        let mut config = Self::new(
            kind,
            settings.client_id.clone(),
            settings.client_secret.clone(),
            redirect_uri,
        )?;

        if let Some(scopes) = &settings.scopes {
            config = config.with_scopes(scopes.clone());
        }
        if let Some(base) = &settings.auth_base_url {
            config = config.with_auth_base_url(base)?;
        }
        if let Some(base) = &settings.api_base_url {
            config = config.with_api_base_url(base)?;
        }

        Ok(config)
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Troca o host dos endpoints de autorização/token mantendo os paths do perfil
    pub fn with_auth_base_url(mut self, base: &str) -> AuthResult<Self> {
        let profile = self.kind.profile();
        let base = Url::parse(base)?;
        self.authorization_endpoint = base.join(profile.authorize_path)?;
        self.token_endpoint = base.join(profile.token_path)?;
        Ok(self)
    }

    pub fn with_api_base_url(mut self, base: &str) -> AuthResult<Self> {
        self.api_base_url = base_with_trailing_slash(base)?;
        Ok(self)
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Valor do parâmetro `scope`, ou `None` quando nenhum scope foi pedido
    pub fn scope_param(&self) -> Option<String> {
        if self.scopes.is_empty() {
            None
        } else {
            Some(self.scope_delimiter.join(&self.scopes))
        }
    }

    /// Resolve um path relativo contra a base da API do provedor
    pub fn api_url(&self, path: &str) -> AuthResult<Url> {
        Ok(self.api_base_url.join(path.trim_start_matches('/'))?)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorization_endpoint", &self.authorization_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("api_base_url", &self.api_base_url.as_str())
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("scope_delimiter", &self.scope_delimiter)
            .field("include_client_id", &self.include_client_id)
            .finish()
    }
}

pub fn default_redirect_uri(kind: ProviderKind) -> String {
    format!("http://localhost:5000/auth/{}/callback", kind)
}

fn base_with_trailing_slash(base: &str) -> AuthResult<Url> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_github_profile_endpoints() {
        let config =
            ProviderConfig::new(ProviderKind::GitHub, "id", "secret", "http://localhost:5000").unwrap();

        assert_eq!(
            config.authorization_endpoint.as_str(),
            "https://github.com/login/oauth/authorize"
        );
        assert_eq!(
            config.token_endpoint.as_str(),
            "https://github.com/login/oauth/access_token"
        );
        assert_eq!(config.api_url("user").unwrap().as_str(), "https://api.github.com/user");
        assert!(!config.include_client_id);
        assert_eq!(config.scope_param(), None);
    }

    #[test]
    fn test_todoist_profile_endpoints_and_scopes() {
        let config =
            ProviderConfig::new(ProviderKind::Todoist, "id", "secret", "http://localhost:5000").unwrap();

        assert_eq!(
            config.authorization_endpoint.as_str(),
            "https://todoist.com/oauth/authorize"
        );
        assert_eq!(
            config.api_url("/sync/v8/sync").unwrap().as_str(),
            "https://api.todoist.com/sync/v8/sync"
        );
        assert!(config.include_client_id);
        assert_eq!(config.token_form_field.as_deref(), Some("token"));
        assert_eq!(
            config.scope_param().unwrap(),
            "task:add,data:read,data:read_write,data:delete,project:delete"
        );
    }

    #[test]
    fn test_scope_delimiters() {
        let scopes = vec!["repo".to_string(), "user".to_string()];
        assert_eq!(ScopeDelimiter::Space.join(&scopes), "repo user");
        assert_eq!(ScopeDelimiter::Comma.join(&scopes), "repo,user");
    }

    #[test]
    fn test_with_auth_base_url_keeps_profile_paths() {
        let config = ProviderConfig::new(ProviderKind::Todoist, "id", "secret", "http://localhost:5000")
            .unwrap()
            .with_auth_base_url("http://127.0.0.1:9999")
            .unwrap()
            .with_api_base_url("http://127.0.0.1:9999/api")
            .unwrap();

        assert_eq!(
            config.token_endpoint.as_str(),
            "http://127.0.0.1:9999/oauth/access_token"
        );
        assert_eq!(
            config.api_url("sync/v8/sync").unwrap().as_str(),
            "http://127.0.0.1:9999/api/sync/v8/sync"
        );
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let result = ProviderConfig::new(ProviderKind::GitHub, "", "secret", "http://localhost");
        assert!(matches!(result, Err(AuthError::ConfigError(_))));

        let result = ProviderConfig::new(ProviderKind::GitHub, "id", "  ", "http://localhost");
        assert!(matches!(result, Err(AuthError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_redirect_uri_rejected() {
        let result = ProviderConfig::new(ProviderKind::GitHub, "id", "secret", "not-a-url");
        assert!(matches!(result, Err(AuthError::InvalidUrl(_))));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config =
            ProviderConfig::new(ProviderKind::GitHub, "id", "super-secret", "http://localhost").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("GitHub".parse::<ProviderKind>().unwrap(), ProviderKind::GitHub);
        assert_eq!("todoist".parse::<ProviderKind>().unwrap(), ProviderKind::Todoist);
        assert!("gitlab".parse::<ProviderKind>().is_err());
    }
}
