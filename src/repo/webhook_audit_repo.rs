use crate::domain::audit::WebhookAuditEntry;
use anyhow::Result;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;

#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &WebhookAuditEntry) -> Result<()>;

    async fn list_recent(&self, limit: i64) -> Result<Vec<WebhookAuditEntry>>;
}

#[derive(Clone)]
pub struct WebhookAuditRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl AuditSink for WebhookAuditRepo {
    async fn append(&self, entry: &WebhookAuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO webhook_audit_log (
                id, method, remote_address, content_type, signature_header, all_headers,
                raw_body, process_status, error_message, matched_payment, integration_id,
                notification_type, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6,
                $7, $8, $9, $10, $11,
                $12, $13
            )
            "#,
        )
        .bind(entry.id)
        .bind(&entry.method)
        .bind(&entry.remote_address)
        .bind(&entry.content_type)
        .bind(&entry.signature_header)
        .bind(serde_json::to_value(&entry.all_headers)?)
        .bind(&entry.raw_body)
        .bind(entry.process_status.as_str())
        .bind(&entry.error_message)
        .bind(entry.matched_payment)
        .bind(&entry.integration_id)
        .bind(&entry.notification_type)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<WebhookAuditEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, method, remote_address, content_type, signature_header, all_headers,
                   raw_body, process_status, error_message, matched_payment, integration_id,
                   notification_type, created_at
            FROM webhook_audit_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<WebhookAuditEntry> {
                let headers: serde_json::Value = row.try_get("all_headers")?;
                let status: String = row.try_get("process_status")?;
                Ok(WebhookAuditEntry {
                    id: row.try_get("id")?,
                    method: row.try_get("method")?,
                    remote_address: row.try_get("remote_address")?,
                    content_type: row.try_get("content_type")?,
                    signature_header: row.try_get("signature_header")?,
                    all_headers: serde_json::from_value::<BTreeMap<String, String>>(headers)?,
                    raw_body: row.try_get("raw_body")?,
                    process_status: status.parse()?,
                    error_message: row.try_get("error_message")?,
                    matched_payment: row.try_get("matched_payment")?,
                    integration_id: row.try_get("integration_id")?,
                    notification_type: row.try_get("notification_type")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
