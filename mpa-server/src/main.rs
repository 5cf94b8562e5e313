use mpa_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env, logging)
    let _ = dotenvy::dotenv();
    let config = Config::from_env()?;
    let _log_guard = setup_environment(&config);

    tracing::info!(
        "mpa-server {} starting (env: {})",
        env!("CARGO_PKG_VERSION"),
        config.environment
    );

    // 2. Stores and services
    let state = ServerState::initialize(&config).await?;

    // 3. HTTP server
    Server::with_state(config, state).run().await?;

    Ok(())
}
