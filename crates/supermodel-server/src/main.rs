//! Binary entry point: configuration, database, LLM client, serve.

use std::sync::Arc;

use anyhow::Result;
use supermodel_config::ServerConfig;
use supermodel_core::SERVICE_TITLE;
use supermodel_llm::{PerplexityClient, SqlGenerator};
use supermodel_server::{db, router, ServerState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".parse().unwrap()),
        )
        .compact()
        .init();

    let config = ServerConfig::from_env();

    let conn = db::init_db(&config.database_path)?;
    db::seed_demo_users(&conn)?;

    let api_key = config.api_key.clone().unwrap_or_default();
    let llm: Arc<dyn SqlGenerator> =
        Arc::new(PerplexityClient::new(api_key, config.model.clone()));

    let addr = config.bind_addr.clone();
    let state = Arc::new(ServerState::new(conn, llm, config));
    let app = router(state);

    info!("{} listening on {}", SERVICE_TITLE, addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
