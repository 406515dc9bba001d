use crate::domain::pending_payment::{
    err, ErrorEnvelope, PendingPayment, RegisterPendingPaymentRequest,
};
use crate::repo::pending_payments_repo::PendingPaymentStore;
use axum::http::StatusCode;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Record-keeping side of checkout creation: every checkout handed to the
/// gateway gets a `pending` row the webhooks can later be matched against.
#[derive(Clone)]
pub struct PendingPaymentService {
    pub payments: Arc<dyn PendingPaymentStore>,
}

impl PendingPaymentService {
    pub async fn register(
        &self,
        req: RegisterPendingPaymentRequest,
    ) -> Result<PendingPayment, (StatusCode, ErrorEnvelope)> {
        if req.amount <= Decimal::ZERO {
            return Err((
                StatusCode::BAD_REQUEST,
                err("INVALID_AMOUNT", "amount must be > 0"),
            ));
        }

        let integration_id = match req.integration_id {
            Some(id) if id.trim().is_empty() => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    err("INVALID_INTEGRATION_ID", "integration_id must not be blank"),
                ))
            }
            Some(id) => id,
            None => new_integration_id(),
        };
        let reference = req.reference.unwrap_or_else(|| integration_id.clone());

        let payment =
            PendingPayment::new(&integration_id, &reference, req.amount, chrono::Utc::now());
        let created = self.payments.create(&payment).await.map_err(internal)?;
        if !created {
            return Err((
                StatusCode::CONFLICT,
                err(
                    "DUPLICATE_INTEGRATION_ID",
                    "a pending payment with this integration_id exists",
                ),
            ));
        }

        tracing::info!(
            integration_id = %payment.integration_id,
            amount = %payment.amount,
            "pending payment registered"
        );
        Ok(payment)
    }

    pub async fn get(
        &self,
        integration_id: &str,
    ) -> Result<PendingPayment, (StatusCode, ErrorEnvelope)> {
        self.payments
            .find_by_integration_id(integration_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| (StatusCode::NOT_FOUND, err("NOT_FOUND", "pending payment not found")))
    }
}

pub fn new_integration_id() -> String {
    format!("INT-{}", Uuid::new_v4().simple())
}

fn internal(e: anyhow::Error) -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        err("INTERNAL_ERROR", &e.to_string()),
    )
}
