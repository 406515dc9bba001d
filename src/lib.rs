pub mod config;
pub mod domain {
    pub mod audit;
    pub mod gateway_config;
    pub mod notification;
    pub mod pending_payment;
}
pub mod http {
    pub mod handlers {
        pub mod audit;
        pub mod ops;
        pub mod pending_payments;
        pub mod sweep;
        pub mod webhooks;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
    pub mod routes;
}
pub mod repo {
    pub mod gateway_config_repo;
    pub mod memory;
    pub mod pending_payments_repo;
    pub mod webhook_audit_repo;
    pub mod webhook_repo;
}
pub mod service {
    pub mod audit_log;
    pub mod broadcaster;
    pub mod config_cache;
    pub mod pending_payment_service;
    pub mod reconciler;
    pub mod sweep_job;
    pub mod webhook_dispatcher;
}
pub mod signature;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub reconciler: service::reconciler::WebhookReconciler,
    pub pending_payment_service: service::pending_payment_service::PendingPaymentService,
    pub pending_payments: Arc<dyn repo::pending_payments_repo::PendingPaymentStore>,
    pub audit_store: Arc<dyn repo::webhook_audit_repo::AuditSink>,
    pub config_provider: Arc<dyn service::config_cache::ConfigProvider>,
    pub sweep_job: service::sweep_job::SweepJob,
    pub sweep_state: service::sweep_job::SweepState,
    pub webhook_read_timeout: std::time::Duration,
    pub internal_api_key: String,
}
