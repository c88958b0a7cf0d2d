/// OAuth2 Authorization Code middleware (GitHub / Todoist)
///
/// - `/auth/:provider` inicia a autorização e guarda o state na sessão
/// - `/auth/:provider/callback` valida o state e troca o código por token
/// - rotas `/github/*` e `/todoist/*` chamam as APIs com o token da sessão
use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use oauth_flow_middleware::{client::build_http_client, config::Settings, handlers, utils::logging::*, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new().context("Failed to load settings")?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let http_client = build_http_client(settings.http_timeout()).context("Failed to build HTTP client")?;
    let state = Arc::new(AppState::new(settings.clone(), http_client));

    if state.flows.is_empty() {
        log_warning("⚠️  Nenhum provider OAuth2 habilitado (defina GITHUB_CLIENT_ID/SECRET ou TODOIST_CLIENT_ID/SECRET)");
    }

    let app = handlers::router(state);

    let port = settings.server.port;
    let listener = TcpListener::bind((settings.server.host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.server.host, port))?;

    log_server_startup(port);
    log_server_ready(port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Falha ao instalar handler de Ctrl+C: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Falha ao instalar handler de SIGTERM: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
