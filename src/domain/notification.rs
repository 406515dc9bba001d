use crate::domain::pending_payment::{PaymentStatus, PendingPayment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Gateway event type. Values the gateway adds later land in `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NotificationType {
    SaleApproved,
    SaleRejected,
    VoidApproved,
    VoidRejected,
    Unknown(String),
}

impl From<String> for NotificationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "SALE_APPROVED" => NotificationType::SaleApproved,
            "SALE_REJECTED" => NotificationType::SaleRejected,
            "VOID_APPROVED" => NotificationType::VoidApproved,
            "VOID_REJECTED" => NotificationType::VoidRejected,
            _ => NotificationType::Unknown(value),
        }
    }
}

impl NotificationType {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationType::SaleApproved => "SALE_APPROVED",
            NotificationType::SaleRejected => "SALE_REJECTED",
            NotificationType::VoidApproved => "VOID_APPROVED",
            NotificationType::VoidRejected => "VOID_REJECTED",
            NotificationType::Unknown(raw) => raw,
        }
    }

    pub fn target_status(&self) -> Option<PaymentStatus> {
        match self {
            NotificationType::SaleApproved => Some(PaymentStatus::Approved),
            NotificationType::SaleRejected => Some(PaymentStatus::Rejected),
            NotificationType::VoidApproved => Some(PaymentStatus::Voided),
            NotificationType::VoidRejected | NotificationType::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayNotification {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: NotificationData,
}

/// The gateway sends `null` for fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationData {
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default, alias = "gateway_code")]
    pub bold_code: Option<String>,
    #[serde(default)]
    pub card: Option<CardData>,
    #[serde(default)]
    pub approval_number: Option<String>,
    #[serde(default)]
    pub metadata: Option<NotificationMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardData {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub masked_pan: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationMetadata {
    #[serde(default)]
    pub reference: Option<String>,
}

impl GatewayNotification {
    pub fn metadata_reference(&self) -> Option<&str> {
        self.data
            .metadata
            .as_ref()
            .and_then(|m| m.reference.as_deref())
            .filter(|r| !r.is_empty())
    }

    /// Key for the integration id lookup: the subject, or the metadata
    /// reference when the subject is empty.
    pub fn correlation_key(&self) -> Option<&str> {
        if self.subject.is_empty() {
            self.metadata_reference()
        } else {
            Some(self.subject.as_str())
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub payment: PendingPayment,
    pub previous_status: PaymentStatus,
    pub status_changed: bool,
}

pub fn apply_notification(
    mut payment: PendingPayment,
    notification: &GatewayNotification,
    raw_payload: &str,
    now: DateTime<Utc>,
) -> TransitionOutcome {
    let previous_status = payment.status;
    let data = &notification.data;

    if let Some(payment_id) = &data.payment_id {
        payment.payment_gateway_id = Some(payment_id.clone());
    }
    if let Some(code) = &data.bold_code {
        payment.gateway_code = Some(code.clone());
    }

    if notification.kind == NotificationType::SaleApproved {
        if let Some(card) = &data.card {
            payment.card_brand = card.brand.clone();
            payment.card_masked_pan = card.masked_pan.clone();
            if data.approval_number.is_some() {
                payment.approval_number = data.approval_number.clone();
            }
        }
    }

    if let Some(next) = notification.kind.target_status() {
        if previous_status.can_transition_to(next) {
            payment.status = next;
        }
    }

    payment.raw_notification = Some(raw_payload.to_string());
    payment.updated_at = now;

    TransitionOutcome {
        status_changed: payment.status != previous_status,
        previous_status,
        payment,
    }
}
