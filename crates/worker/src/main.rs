use anyhow::Context;
use tokio::sync::watch;

use requisition_releases_infra::{
    PostgresRowReader, RedisSqlExecutor, ReleaseCaller, ServiceConfig,
};
use requisition_releases_worker::{RedisListQueue, ReleaseHandler, ReleaseWorker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    requisition_releases_observability::init();

    let config = ServiceConfig::from_env().context("failed to load configuration")?;

    let reader = PostgresRowReader::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    let executor = RedisSqlExecutor::new(&config.redis_url, &config.queue_to_sql, config.sql_reply_timeout)
        .context("failed to create sql executor client")?;
    let queue = RedisListQueue::new(&config.redis_url, &config.queue_from, &config.queue_to)
        .context("failed to create queue client")?;

    let worker = ReleaseWorker::new(ReleaseHandler::new(ReleaseCaller::new(reader, executor)), queue);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        queue_from = %config.queue_from,
        queue_to = %config.queue_to,
        queue_to_sql = %config.queue_to_sql,
        "consuming release requests"
    );
    worker.run(shutdown_rx).await;

    Ok(())
}
