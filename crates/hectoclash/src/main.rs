use hectoclash::{HectoclashError, HectoclashServer, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), HectoclashError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hectoclash=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(addr = %config.addr, auto_open_games = config.auto_open_games, "starting");

    HectoclashServer::builder()
        .config(config)
        .build()
        .await?
        .run()
        .await
}
