mod queue;
mod quickbooks;
mod sync;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use ledgersync_config::{init_tracing, AppConfig, SyncConfig};
use ledgersync_db::connection::pg_repository::PgConnectionRepository;
use ledgersync_db::sync::pg_repository::PgSyncStatusRepository;
use ledgersync_queue::RedisQueue;
use tokio::sync::watch;

use crate::queue::QueueConsumer;
use crate::quickbooks::client::QboClientConfig;
use crate::sync::fetcher::QuickBooksScopeFactory;
use crate::sync::orchestrator::SyncOrchestrator;
use crate::sync::retry::RetryPolicy;

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    let sync_config = SyncConfig::from_env().expect("failed to load sync config");
    let qbo_config = QboClientConfig::from_env().expect("failed to load QuickBooks config");

    tracing::info!(
        service = "ledgersync-worker",
        queue = %config.queue_name,
        max_retry_count = sync_config.max_retry_count,
        retry_delay_secs = sync_config.retry_delay_secs,
        incremental = sync_config.incremental,
        "starting"
    );

    let pool = ledgersync_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    let queue = RedisQueue::connect(
        &config.redis_url,
        &config.queue_name,
        sync_config.max_deliveries,
    )
    .await
    .expect("failed to connect to redis");

    if let Err(e) = queue.recover_in_flight().await {
        tracing::error!(queue = queue.name(), error = %e, "failed to recover in-flight messages");
    }

    let scopes = QuickBooksScopeFactory::new(
        PgConnectionRepository::new(pool.clone()),
        pool.clone(),
        qbo_config,
        sync_config.incremental,
    );
    let orchestrator = SyncOrchestrator::new(
        Arc::new(scopes),
        Arc::new(PgSyncStatusRepository::new(pool)),
        RetryPolicy::from(&sync_config),
    );

    let consumer = QueueConsumer::new(
        queue,
        orchestrator,
        Duration::from_secs(sync_config.poll_timeout_secs),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        tracing::info!("shutdown requested");
        let _ = shutdown_tx.send(true);
    });

    consumer.run(shutdown_rx).await;
    tracing::info!("shutting down");
}
