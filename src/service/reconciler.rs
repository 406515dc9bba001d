use crate::domain::audit::{AuditDraft, ProcessStatus};
use crate::domain::gateway_config::GatewayConfig;
use crate::domain::notification::{apply_notification, GatewayNotification, NotificationType};
use crate::domain::pending_payment::{err, PendingPayment};
use crate::repo::pending_payments_repo::PendingPaymentStore;
use crate::repo::webhook_audit_repo::AuditSink;
use crate::service::audit_log::AuditLog;
use crate::service::broadcaster::{Broadcaster, PAYMENT_UPDATE_EVENT};
use crate::service::config_cache::ConfigProvider;
use crate::signature;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-bold-signature";

const MAX_SAVE_ATTEMPTS: usize = 3;

#[derive(Debug)]
pub struct InboundWebhook {
    pub method: Method,
    pub remote_address: String,
    pub headers: HeaderMap,
    /// Body bytes, or the reason the transport could not read them.
    pub body: Result<Bytes, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookAck {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl WebhookAck {
    fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/plain; charset=utf-8",
            body: "OK".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("method {0} not allowed")]
    Method(String),
    #[error("failed to read request body: {0}")]
    Read(String),
    #[error("gateway configuration unavailable: {0}")]
    Config(String),
    #[error("{0}")]
    Signature(&'static str),
    #[error("invalid notification payload: {0}")]
    Parse(String),
    #[error("{0}")]
    Processing(String),
}

impl WebhookError {
    pub fn process_status(&self) -> ProcessStatus {
        match self {
            WebhookError::Method(_) => ProcessStatus::FailedMethod,
            WebhookError::Read(_) => ProcessStatus::FailedRead,
            WebhookError::Config(_) => ProcessStatus::FailedConfig,
            WebhookError::Signature(_) => ProcessStatus::FailedSignature,
            WebhookError::Parse(_) => ProcessStatus::FailedParse,
            WebhookError::Processing(_) => ProcessStatus::FailedProcessing,
        }
    }

    /// Processing failures are acknowledged with 200 so the gateway does not
    /// keep redelivering; the audit trail keeps the real cause.
    pub fn http_status(&self) -> StatusCode {
        match self {
            WebhookError::Method(_) => StatusCode::METHOD_NOT_ALLOWED,
            WebhookError::Read(_) | WebhookError::Parse(_) => StatusCode::BAD_REQUEST,
            WebhookError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::Signature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::Processing(_) => StatusCode::OK,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            WebhookError::Method(_) => "METHOD_NOT_ALLOWED",
            WebhookError::Read(_) => "UNREADABLE_BODY",
            WebhookError::Config(_) => "CONFIG_UNAVAILABLE",
            WebhookError::Signature(_) => "INVALID_SIGNATURE",
            WebhookError::Parse(_) => "INVALID_PAYLOAD",
            WebhookError::Processing(_) => "NOT_RECONCILED",
        }
    }

    fn ack(&self) -> WebhookAck {
        let body = serde_json::to_string(&err(self.code(), &self.to_string()))
            .unwrap_or_else(|_| self.to_string());
        WebhookAck {
            status: self.http_status(),
            content_type: "application/json",
            body,
        }
    }
}

#[derive(Clone)]
pub struct WebhookReconciler {
    config: Arc<dyn ConfigProvider>,
    payments: Arc<dyn PendingPaymentStore>,
    audit: AuditLog,
    broadcaster: Option<Arc<dyn Broadcaster>>,
}

impl WebhookReconciler {
    /// `broadcaster` may be `None`, in which case reconciled payments are not
    /// announced anywhere.
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        payments: Arc<dyn PendingPaymentStore>,
        audit_sink: Arc<dyn AuditSink>,
        broadcaster: Option<Arc<dyn Broadcaster>>,
    ) -> Self {
        Self {
            config,
            payments,
            audit: AuditLog::new(audit_sink),
            broadcaster,
        }
    }

    pub async fn handle(&self, inbound: InboundWebhook) -> WebhookAck {
        let mut draft = AuditDraft::from_request(
            &inbound.method,
            &inbound.remote_address,
            &inbound.headers,
            SIGNATURE_HEADER,
        );

        let (entry, ack) = match self.process(&inbound, &mut draft).await {
            Ok(payment) => {
                tracing::info!(
                    integration_id = %payment.integration_id,
                    status = %payment.status,
                    "webhook reconciled"
                );
                (draft.succeed(Utc::now()), WebhookAck::ok())
            }
            Err(e) => {
                let status = e.process_status();
                if status == ProcessStatus::FailedProcessing {
                    tracing::error!(
                        process_status = %status,
                        remote = %inbound.remote_address,
                        "webhook not reconciled: {}",
                        e
                    );
                } else {
                    tracing::warn!(
                        process_status = %status,
                        remote = %inbound.remote_address,
                        "webhook rejected: {}",
                        e
                    );
                }
                let ack = e.ack();
                (draft.fail(status, e.to_string(), Utc::now()), ack)
            }
        };

        self.audit.record(entry).await;
        ack
    }

    async fn process(
        &self,
        inbound: &InboundWebhook,
        draft: &mut AuditDraft,
    ) -> Result<PendingPayment, WebhookError> {
        if let Ok(body) = &inbound.body {
            draft.raw_body = body.to_vec();
        }

        if inbound.method != Method::POST {
            return Err(WebhookError::Method(inbound.method.to_string()));
        }

        let body = inbound
            .body
            .as_ref()
            .map_err(|reason| WebhookError::Read(reason.clone()))?;

        let config = self
            .config
            .get_config()
            .await
            .map_err(|e| WebhookError::Config(e.to_string()))?;
        if !config.enabled {
            tracing::warn!(
                environment = %config.environment,
                "gateway integration disabled, reconciling anyway"
            );
        }

        authenticate(&config, body, draft.signature())?;

        let notification: GatewayNotification =
            serde_json::from_slice(body).map_err(|e| WebhookError::Parse(e.to_string()))?;
        draft.notification_type = Some(notification.kind.as_str().to_string());
        if let NotificationType::Unknown(kind) = &notification.kind {
            tracing::warn!(notification_type = %kind, "unknown gateway notification type");
        }

        let raw_payload = String::from_utf8_lossy(body);
        let payment = self.reconcile(&notification, &raw_payload, draft).await?;

        self.notify(&payment).await;
        Ok(payment)
    }

    async fn reconcile(
        &self,
        notification: &GatewayNotification,
        raw_payload: &str,
        draft: &mut AuditDraft,
    ) -> Result<PendingPayment, WebhookError> {
        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            let current = self.locate(notification).await?.ok_or_else(|| {
                WebhookError::Processing(format!(
                    "no pending payment for subject '{}' or reference '{}'",
                    notification.subject,
                    notification.metadata_reference().unwrap_or_default()
                ))
            })?;
            draft.integration_id = Some(current.integration_id.clone());

            let outcome = apply_notification(current, notification, raw_payload, Utc::now());
            let written = self
                .payments
                .save(&outcome.payment, outcome.previous_status)
                .await
                .map_err(|e| {
                    WebhookError::Processing(format!(
                        "failed to update pending payment {}: {}",
                        outcome.payment.integration_id, e
                    ))
                })?;

            if written {
                if !outcome.status_changed {
                    tracing::info!(
                        integration_id = %outcome.payment.integration_id,
                        notification_type = notification.kind.as_str(),
                        status = %outcome.payment.status,
                        "notification left status unchanged"
                    );
                }
                return Ok(outcome.payment);
            }

            tracing::warn!(
                integration_id = %outcome.payment.integration_id,
                attempt,
                "pending payment changed concurrently, re-reading"
            );
        }

        Err(WebhookError::Processing(
            "pending payment kept changing concurrently".to_string(),
        ))
    }

    async fn locate(
        &self,
        notification: &GatewayNotification,
    ) -> Result<Option<PendingPayment>, WebhookError> {
        let lookup_failed = |e: anyhow::Error| {
            WebhookError::Processing(format!("pending payment lookup failed: {e}"))
        };

        if let Some(key) = notification.correlation_key() {
            if let Some(found) = self
                .payments
                .find_by_integration_id(key)
                .await
                .map_err(lookup_failed)?
            {
                return Ok(Some(found));
            }
        }

        match notification.metadata_reference() {
            Some(reference) => self
                .payments
                .find_by_reference(reference)
                .await
                .map_err(lookup_failed),
            None => Ok(None),
        }
    }

    async fn notify(&self, payment: &PendingPayment) {
        let Some(broadcaster) = &self.broadcaster else {
            return;
        };

        let payload = serde_json::json!({
            "integration_id": payment.integration_id,
            "status": payment.status,
            "payment_id": payment.payment_gateway_id,
            "bold_code": payment.gateway_code,
            "amount": payment.amount,
            "card_brand": payment.card_brand,
            "card_masked_pan": payment.card_masked_pan,
            "approval_number": payment.approval_number,
        });
        broadcaster.broadcast(PAYMENT_UPDATE_EVENT, payload).await;
    }
}

fn authenticate(
    config: &GatewayConfig,
    body: &[u8],
    signature_header: Option<&str>,
) -> Result<(), WebhookError> {
    match (signature_header, config.signing_secret()) {
        (Some(sig), Some(secret)) => {
            if signature::verify(body, sig, secret) {
                Ok(())
            } else {
                Err(WebhookError::Signature("signature mismatch"))
            }
        }
        (None, _) if config.is_production() => {
            Err(WebhookError::Signature("missing signature header"))
        }
        (Some(_), None) if config.is_production() => {
            Err(WebhookError::Signature("webhook secret not configured"))
        }
        _ => {
            tracing::warn!(
                environment = %config.environment,
                "signature or secret absent, skipping verification"
            );
            Ok(())
        }
    }
}
