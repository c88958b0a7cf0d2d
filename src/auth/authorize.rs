//! Construção da URL de autorização

use url::Url;

use super::provider::ProviderConfig;
use super::state::AuthorizationState;

/// Monta a URL do endpoint de autorização do provedor
///
/// Parâmetros: `response_type=code`, `client_id`, `redirect_uri`, `scope`
/// (omitido quando não há scopes) e `state`. O chamador precisa guardar o
/// state na sessão antes de redirecionar o usuário.
pub fn build_authorization_url(config: &ProviderConfig, state: &AuthorizationState) -> Url {
    let mut url = config.authorization_endpoint.clone();

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri);

        if let Some(scope) = config.scope_param() {
            query.append_pair("scope", &scope);
        }

        query.append_pair("state", state.as_str());
    }

    url
}
