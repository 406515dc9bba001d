use crate::domain::audit::WebhookAuditEntry;
use crate::domain::pending_payment::{PaymentStatus, PendingPayment};
use crate::repo::pending_payments_repo::PendingPaymentStore;
use crate::repo::webhook_audit_repo::AuditSink;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Pending payments held in process memory, keyed by integration id.
///
/// Every operation takes the write lock for its whole read-modify-write, so a
/// conditional `save` behaves like the single UPDATE of the Postgres store.
#[derive(Default, Clone)]
pub struct InMemoryPendingPayments {
    rows: Arc<RwLock<HashMap<String, PendingPayment>>>,
}

impl InMemoryPendingPayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<PendingPayment> {
        self.rows.read().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl PendingPaymentStore for InMemoryPendingPayments {
    async fn create(&self, payment: &PendingPayment) -> Result<bool> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&payment.integration_id) {
            return Ok(false);
        }
        rows.insert(payment.integration_id.clone(), payment.clone());
        Ok(true)
    }

    async fn find_by_integration_id(&self, integration_id: &str) -> Result<Option<PendingPayment>> {
        Ok(self.rows.read().await.get(integration_id).cloned())
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PendingPayment>> {
        let rows = self.rows.read().await;
        Ok(rows
            .values()
            .filter(|p| p.reference == reference)
            .max_by_key(|p| p.created_at)
            .cloned())
    }

    async fn save(&self, payment: &PendingPayment, expected: PaymentStatus) -> Result<bool> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&payment.integration_id) {
            Some(current) if current.status == expected => {
                let created_at = current.created_at;
                *current = payment.clone();
                current.created_at = created_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn bulk_cancel_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;
        let mut cancelled = 0;
        for row in rows.values_mut() {
            if row.status == PaymentStatus::Pending && row.created_at < cutoff {
                row.status = PaymentStatus::Cancelled;
                row.updated_at = now;
                cancelled += 1;
            }
        }
        Ok(cancelled)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAuditLog {
    entries: Arc<RwLock<Vec<WebhookAuditEntry>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<WebhookAuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait::async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn append(&self, entry: &WebhookAuditEntry) -> Result<()> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<WebhookAuditEntry>> {
        let entries = self.entries.read().await;
        let mut recent: Vec<_> = entries.iter().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn duplicate_integration_id_is_rejected() {
        let store = InMemoryPendingPayments::new();
        let payment = PendingPayment::new("INT-1", "REF-1", dec!(10), Utc::now());
        assert!(store.create(&payment).await.unwrap());
        assert!(!store.create(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn stale_save_is_refused() {
        let store = InMemoryPendingPayments::new();
        let mut payment = PendingPayment::new("INT-1", "REF-1", dec!(10), Utc::now());
        store.create(&payment).await.unwrap();

        payment.status = PaymentStatus::Approved;
        assert!(store.save(&payment, PaymentStatus::Pending).await.unwrap());
        assert!(!store.save(&payment, PaymentStatus::Pending).await.unwrap());
    }

    #[tokio::test]
    async fn reference_lookup_prefers_newest_row() {
        let store = InMemoryPendingPayments::new();
        let now = Utc::now();
        store
            .create(&PendingPayment::new("INT-OLD", "REF", dec!(1), now - Duration::hours(2)))
            .await
            .unwrap();
        store
            .create(&PendingPayment::new("INT-NEW", "REF", dec!(1), now))
            .await
            .unwrap();

        let found = store.find_by_reference("REF").await.unwrap().unwrap();
        assert_eq!(found.integration_id, "INT-NEW");
    }
}
