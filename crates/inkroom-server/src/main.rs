use inkroom_server::auth::StaticTokenVerifier;
use inkroom_server::config::ServerConfig;
use inkroom_server::error::ServerError;
use inkroom_server::{AppState, app};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkroom_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let verifier = StaticTokenVerifier::new(config.tokens);
    if verifier.is_empty() {
        warn!("INKROOM_TOKENS is empty, every handshake will be rejected");
    }
    let state = AppState::new(verifier);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("inkroom relay server listening on {}", listener.local_addr()?);
    info!("WebSocket endpoint: ws://{}/ws?token=<token>", config.addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
