use crate::domain::audit::WebhookAuditEntry;
use crate::repo::webhook_audit_repo::AuditSink;
use std::sync::Arc;

/// Append-only webhook audit trail. Persistence failures are logged and
/// swallowed so they never replace the real webhook outcome.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<dyn AuditSink>,
}

impl AuditLog {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, entry: WebhookAuditEntry) {
        if let Err(err) = self.sink.append(&entry).await {
            tracing::error!(
                audit_id = %entry.id,
                process_status = %entry.process_status,
                "failed to persist webhook audit entry: {}",
                err
            );
        }
    }
}
