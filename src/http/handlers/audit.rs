use crate::domain::pending_payment::err;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

pub async fn list_webhook_audit(
    State(state): State<AppState>,
    Query(q): Query<AuditQuery>,
) -> impl IntoResponse {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    match state.audit_store.list_recent(limit).await {
        Ok(entries) => {
            (StatusCode::OK, Json(serde_json::json!({ "entries": entries }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(err("INTERNAL_ERROR", &e.to_string())),
        )
            .into_response(),
    }
}
