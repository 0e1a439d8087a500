use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use book_review_api::{
    config::Settings,
    logging,
    server::{router, AppState},
    store::MemoryStore,
    token::{SystemClock, TokenService},
    validation::ConstraintValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env().context("failed to load settings")?;
    logging::init(settings.log_format);

    let tokens = Arc::new(TokenService::from_settings(&settings.jwt, Arc::new(SystemClock)));
    let state = AppState::new(MemoryStore::shared(), tokens, Arc::new(ConstraintValidator));

    let addr = settings.server.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "book-review API listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
