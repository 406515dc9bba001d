use payment_reconciler::config::AppConfig;
use payment_reconciler::http::routes::router;
use payment_reconciler::repo::gateway_config_repo::GatewayConfigRepo;
use payment_reconciler::repo::pending_payments_repo::{PendingPaymentStore, PendingPaymentsRepo};
use payment_reconciler::repo::webhook_audit_repo::{AuditSink, WebhookAuditRepo};
use payment_reconciler::repo::webhook_repo::SubscriptionsRepo;
use payment_reconciler::service::broadcaster::{Broadcaster, FanoutBroadcaster, RedisBroadcaster};
use payment_reconciler::service::config_cache::{ConfigCache, ConfigProvider};
use payment_reconciler::service::pending_payment_service::PendingPaymentService;
use payment_reconciler::service::reconciler::WebhookReconciler;
use payment_reconciler::service::sweep_job::{SweepJob, SweepState};
use payment_reconciler::service::webhook_dispatcher::SubscriberDispatcher;
use payment_reconciler::AppState;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let pending_payments: Arc<dyn PendingPaymentStore> =
        Arc::new(PendingPaymentsRepo { pool: pool.clone() });
    let audit_store: Arc<dyn AuditSink> = Arc::new(WebhookAuditRepo { pool: pool.clone() });
    let config_provider: Arc<dyn ConfigProvider> = Arc::new(ConfigCache::new(
        GatewayConfigRepo { pool: pool.clone() },
        cfg.gateway_config_ttl,
    ));

    let redis_updates: Arc<dyn Broadcaster> = Arc::new(RedisBroadcaster {
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
        channel: cfg.payment_updates_channel.clone(),
    });
    let http_subscribers: Arc<dyn Broadcaster> = Arc::new(SubscriberDispatcher {
        subscriptions_repo: SubscriptionsRepo { pool: pool.clone() },
        client: reqwest::Client::new(),
        timeout: cfg.subscriber_timeout,
    });
    let broadcaster: Arc<dyn Broadcaster> =
        Arc::new(FanoutBroadcaster::new(vec![redis_updates, http_subscribers]));

    let reconciler = WebhookReconciler::new(
        config_provider.clone(),
        pending_payments.clone(),
        audit_store.clone(),
        Some(broadcaster),
    );

    let sweep_job = SweepJob::new(pending_payments.clone(), cfg.sweep_interval);
    let sweep_state = SweepState::default();
    if cfg.sweep_enabled {
        tokio::spawn(sweep_job.clone().run(sweep_state.clone()));
    }

    let state = AppState {
        reconciler,
        pending_payment_service: PendingPaymentService {
            payments: pending_payments.clone(),
        },
        pending_payments,
        audit_store,
        config_provider,
        sweep_job,
        sweep_state,
        webhook_read_timeout: cfg.webhook_read_timeout,
        internal_api_key: cfg.internal_api_key.clone(),
    };

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
