use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Voided,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Voided => "voided",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a gateway notification may set a record in `self` to `next`.
    ///
    /// Gateway outcomes overwrite any earlier status, including a sweep
    /// cancellation. A voided record is final.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        *self != PaymentStatus::Voided || next == PaymentStatus::Voided
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "approved" => Ok(PaymentStatus::Approved),
            "rejected" => Ok(PaymentStatus::Rejected),
            "voided" => Ok(PaymentStatus::Voided),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(anyhow::anyhow!("unknown pending payment status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingPayment {
    pub integration_id: String,
    pub reference: String,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_gateway_id: Option<String>,
    pub gateway_code: Option<String>,
    pub card_brand: Option<String>,
    pub card_masked_pan: Option<String>,
    pub approval_number: Option<String>,
    pub raw_notification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PendingPayment {
    pub fn new(integration_id: &str, reference: &str, amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            integration_id: integration_id.to_string(),
            reference: reference.to_string(),
            amount,
            status: PaymentStatus::Pending,
            payment_gateway_id: None,
            gateway_code: None,
            card_brand: None,
            card_masked_pan: None,
            approval_number: None,
            raw_notification: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPendingPaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub integration_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}
