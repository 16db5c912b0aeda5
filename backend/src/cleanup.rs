use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use crate::context::Context;
use crate::store::{PollStore, StoreError};

/// Periodically removes expired polls until `shutdown` fires.
pub async fn run_cleanup_task(store: Arc<dyn PollStore>, every: Duration, shutdown: CancellationToken) {
    let mut interval = interval(every);
    info!("🧹 Cleanup service started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        let ctx = Context::from_token(shutdown.child_token());
        match store.purge_expired(&ctx).await {
            Ok(0) => debug!("No expired polls to remove"),
            Ok(count) => info!("🗑️ Removed {} expired poll records", count),
            Err(StoreError::Cancelled) => break,
            Err(e) => error!("Cleanup failed: {}", e),
        }
    }

    info!("Cleanup service stopped");
}
