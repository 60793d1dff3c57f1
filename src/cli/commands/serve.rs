use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::app::app;
use crate::config::AppConfig;
use crate::database::{
    DatabaseManager, MemorySheetStore, MemoryUserStore, PgSheetStore, PgUserStore, SheetStore,
    UserStore,
};
use crate::google::{GoogleOAuthClient, GoogleSheetsClient};
use crate::state::AppState;

pub async fn handle(mut config: AppConfig, port: Option<u16>, memory: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let missing = config.missing_required();
    if !missing.is_empty() {
        bail!("missing required configuration: {}", missing.join(", "));
    }

    let (sheets, users) = build_stores(&config, memory).await?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;
    let identity = Arc::new(GoogleOAuthClient::new(http.clone(), config.google.clone()));
    let documents = Arc::new(GoogleSheetsClient::new(http));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting Sheet Groups API in {:?} mode", config.environment);

    let state = AppState::new(config, sheets, users, identity, documents);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")
}

async fn build_stores(
    config: &AppConfig,
    memory: bool,
) -> anyhow::Result<(Arc<dyn SheetStore>, Arc<dyn UserStore>)> {
    if memory || config.database.url.is_none() {
        if !memory {
            warn!("DATABASE_URL not set, sheets and users will not survive a restart");
        }
        return Ok((Arc::new(MemorySheetStore::new()), Arc::new(MemoryUserStore::new())));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to Postgres")?;

    Ok((
        Arc::new(PgSheetStore::new(pool.clone())),
        Arc::new(PgUserStore::new(pool)),
    ))
}
