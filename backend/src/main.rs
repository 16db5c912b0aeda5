use std::sync::Arc;
use backend::{
    cleanup::run_cleanup_task,
    clock::SystemClock,
    config::{AppConfig, StoreKind},
    logging::init_tracing,
    routes::AppState,
    service::PollService,
    store::{MemoryStore, PgStore, PollStore},
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

async fn open_store(config: &AppConfig) -> Result<Arc<dyn PollStore>, Box<dyn std::error::Error>> {
    match config.store {
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set when store = \"postgres\"")?;
            let store = PgStore::connect(url, config.max_connections).await?;
            store.migrate().await?;
            info!("📋 Migrations complete");
            Ok(Arc::new(store))
        }
        StoreKind::Memory => {
            warn!("Using in-memory store - polls will not survive a restart");
            Ok(Arc::new(MemoryStore::new(Arc::new(SystemClock))))
        }
    }
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    info!("🚀 Starting poll server");

    let figment = AppConfig::figment();
    let config = AppConfig::from_figment(&figment)?;
    let store = open_store(&config).await?;

    let shutdown = CancellationToken::new();
    let cleanup = tokio::spawn(run_cleanup_task(
        Arc::clone(&store),
        config.cleanup_interval(),
        shutdown.clone(),
    ));

    let service = PollService::new(Arc::clone(&store), Arc::new(SystemClock), config.poll_settings());
    let state = AppState::new(service, shutdown.clone(), config.request_timeout());

    let launched = match backend::build(figment, state).ignite().await {
        Ok(rocket) => {
            let handle = rocket.shutdown();
            let token = shutdown.clone();
            tokio::spawn(async move {
                handle.await;
                token.cancel();
            });
            rocket.launch().await.map(|_| ())
        }
        Err(e) => Err(e),
    };

    shutdown.cancel();
    if let Err(e) = cleanup.await {
        error!("Cleanup task panicked: {}", e);
    }
    if let Err(e) = store.close().await {
        error!("Failed to close store: {}", e);
    }
    info!("Server stopped");

    launched.map_err(Into::into)
}
