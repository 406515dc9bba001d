#![allow(dead_code)]

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method};
use chrono::{DateTime, Utc};
use payment_reconciler::domain::gateway_config::GatewayConfig;
use payment_reconciler::domain::pending_payment::{PaymentStatus, PendingPayment};
use payment_reconciler::repo::memory::{InMemoryAuditLog, InMemoryPendingPayments};
use payment_reconciler::repo::pending_payments_repo::PendingPaymentStore;
use payment_reconciler::service::broadcaster::Broadcaster;
use payment_reconciler::service::config_cache::StaticConfigProvider;
use payment_reconciler::service::reconciler::{InboundWebhook, WebhookReconciler, SIGNATURE_HEADER};
use payment_reconciler::signature::sign;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SECRET: &str = "prod-secret";
pub const SANDBOX_SECRET: &str = "sandbox-secret";

pub fn production_config() -> GatewayConfig {
    GatewayConfig {
        enabled: true,
        environment: "production".to_string(),
        webhook_secret: Some(SECRET.to_string()),
        webhook_secret_sandbox: Some(SANDBOX_SECRET.to_string()),
        base_url: "https://gateway.test".to_string(),
    }
}

pub fn sandbox_config() -> GatewayConfig {
    GatewayConfig {
        environment: "sandbox".to_string(),
        ..production_config()
    }
}

#[derive(Clone, Default)]
pub struct RecordingBroadcaster {
    pub events: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
}

impl RecordingBroadcaster {
    pub async fn events(&self) -> Vec<(String, serde_json::Value)> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn broadcast(&self, event: &str, payload: serde_json::Value) {
        self.events.lock().await.push((event.to_string(), payload));
    }
}

pub struct Harness {
    pub reconciler: WebhookReconciler,
    pub payments: InMemoryPendingPayments,
    pub audit: InMemoryAuditLog,
    pub broadcasts: RecordingBroadcaster,
}

pub fn harness(config: StaticConfigProvider) -> Harness {
    let payments = InMemoryPendingPayments::new();
    let audit = InMemoryAuditLog::new();
    let broadcasts = RecordingBroadcaster::default();
    let reconciler = WebhookReconciler::new(
        Arc::new(config),
        Arc::new(payments.clone()),
        Arc::new(audit.clone()),
        Some(Arc::new(broadcasts.clone())),
    );
    Harness {
        reconciler,
        payments,
        audit,
        broadcasts,
    }
}

pub fn production_harness() -> Harness {
    harness(StaticConfigProvider::new(production_config()))
}

pub async fn seed(
    store: &dyn PendingPaymentStore,
    integration_id: &str,
    reference: &str,
) -> PendingPayment {
    seed_at(store, integration_id, reference, Utc::now()).await
}

pub async fn seed_at(
    store: &dyn PendingPaymentStore,
    integration_id: &str,
    reference: &str,
    created_at: DateTime<Utc>,
) -> PendingPayment {
    let payment = PendingPayment::new(integration_id, reference, dec!(150000.00), created_at);
    assert!(store.create(&payment).await.unwrap());
    payment
}

pub async fn status_of(store: &dyn PendingPaymentStore, integration_id: &str) -> PaymentStatus {
    store
        .find_by_integration_id(integration_id)
        .await
        .unwrap()
        .unwrap()
        .status
}

pub fn notification(kind: &str, subject: &str, reference: &str) -> String {
    serde_json::json!({
        "type": kind,
        "subject": subject,
        "data": {
            "payment_id": "PAY-778",
            "bold_code": "BOLD-42",
            "card": { "brand": "VISA", "masked_pan": "411111******1111" },
            "approval_number": "A-1029",
            "metadata": { "reference": reference }
        }
    })
    .to_string()
}

pub fn post(body: &str, signature: Option<&str>) -> InboundWebhook {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    if let Some(sig) = signature {
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(sig).unwrap());
    }
    InboundWebhook {
        method: Method::POST,
        remote_address: "198.51.100.7".to_string(),
        headers,
        body: Ok(Bytes::from(body.to_string())),
    }
}

pub fn signed_post(body: &str, secret: &str) -> InboundWebhook {
    let sig = sign(body.as_bytes(), secret).unwrap();
    post(body, Some(&sig))
}
