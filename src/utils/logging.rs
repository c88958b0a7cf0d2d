use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_provider_enabled(provider: &str, client_id: &str, scopes: &[String]) {
    info!(
        "✅ [OAuth2] Provider '{}' habilitado - client_id: {} - scopes: {:?}",
        provider,
        super::mask_value(client_id, 4),
        scopes
    );
}

pub fn log_provider_disabled(provider: &str, reason: &str) {
    warn!("⚠️  [OAuth2] Provider '{}' desabilitado: {}", provider, reason);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 OAuth flow middleware server starting on port {}", port);
}

pub fn log_server_ready(port: u16) {
    info!("✅ Server ready and listening on http://0.0.0.0:{}", port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_provider_api_error(endpoint: &str, status: Option<u16>, error: &str) {
    error!("Provider API error: {} - Status: {:?} - Error: {}", endpoint, status, error);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
