use anyhow::Result;
use payment_reconciler::config::AppConfig;
use payment_reconciler::repo::pending_payments_repo::PendingPaymentsRepo;
use payment_reconciler::service::sweep_job::SweepJob;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Single sweep pass, for cron or any other external scheduler.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cfg.database_url)
        .await?;

    let job = SweepJob::new(Arc::new(PendingPaymentsRepo { pool }), cfg.sweep_interval);
    let cancelled = job.sweep().await?;
    tracing::info!(cancelled, "sweep finished");
    Ok(())
}
