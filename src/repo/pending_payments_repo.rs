use crate::domain::pending_payment::{PaymentStatus, PendingPayment};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait::async_trait]
pub trait PendingPaymentStore: Send + Sync {
    /// Inserts a new record. Returns `false` when the integration id is taken.
    async fn create(&self, payment: &PendingPayment) -> Result<bool>;

    async fn find_by_integration_id(&self, integration_id: &str) -> Result<Option<PendingPayment>>;

    /// Most recently created record carrying `reference`.
    async fn find_by_reference(&self, reference: &str) -> Result<Option<PendingPayment>>;

    /// Writes `payment` only if the stored status still equals `expected`.
    /// Returns `false` when another writer got there first.
    async fn save(&self, payment: &PendingPayment, expected: PaymentStatus) -> Result<bool>;

    async fn bulk_cancel_stale(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

#[derive(Clone)]
pub struct PendingPaymentsRepo {
    pub pool: PgPool,
}

const COLUMNS: &str = "integration_id, reference, amount, status, payment_gateway_id, gateway_code, \
     card_brand, card_masked_pan, approval_number, raw_notification, created_at, updated_at";

#[async_trait::async_trait]
impl PendingPaymentStore for PendingPaymentsRepo {
    async fn create(&self, payment: &PendingPayment) -> Result<bool> {
        let res = sqlx::query(
            r#"
            INSERT INTO pending_payments (
                integration_id, reference, amount, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (integration_id) DO NOTHING
            "#,
        )
        .bind(&payment.integration_id)
        .bind(&payment.reference)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn find_by_integration_id(&self, integration_id: &str) -> Result<Option<PendingPayment>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM pending_payments WHERE integration_id = $1"
        ))
        .bind(integration_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn find_by_reference(&self, reference: &str) -> Result<Option<PendingPayment>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM pending_payments WHERE reference = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    async fn save(&self, payment: &PendingPayment, expected: PaymentStatus) -> Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE pending_payments
            SET status = $2,
                payment_gateway_id = $3,
                gateway_code = $4,
                card_brand = $5,
                card_masked_pan = $6,
                approval_number = $7,
                raw_notification = $8,
                updated_at = $9
            WHERE integration_id = $1 AND status = $10
            "#,
        )
        .bind(&payment.integration_id)
        .bind(payment.status.as_str())
        .bind(&payment.payment_gateway_id)
        .bind(&payment.gateway_code)
        .bind(&payment.card_brand)
        .bind(&payment.card_masked_pan)
        .bind(&payment.approval_number)
        .bind(&payment.raw_notification)
        .bind(payment.updated_at)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected() == 1)
    }

    async fn bulk_cancel_stale(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE pending_payments
            SET status = 'cancelled', updated_at = now()
            WHERE status = 'pending' AND created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(res.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn map_row(row: &PgRow) -> Result<PendingPayment> {
    let status: String = row.try_get("status")?;
    Ok(PendingPayment {
        integration_id: row.try_get("integration_id")?,
        reference: row.try_get("reference")?,
        amount: row.try_get("amount")?,
        status: status.parse()?,
        payment_gateway_id: row.try_get("payment_gateway_id")?,
        gateway_code: row.try_get("gateway_code")?,
        card_brand: row.try_get("card_brand")?,
        card_masked_pan: row.try_get("card_masked_pan")?,
        approval_number: row.try_get("approval_number")?,
        raw_notification: row.try_get("raw_notification")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
