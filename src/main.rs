use anyhow::Context;
use blackjack_server::{router, AppState, Config};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    let state = AppState::new(&config);
    let app = router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;
    info!(
        addr = %config.listen,
        public_dir = %config.public_dir.display(),
        starting_balance = config.starting_balance,
        redeem_codes = config.redeem_codes.len(),
        "blackjack server listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
