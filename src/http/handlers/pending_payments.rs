use crate::domain::pending_payment::RegisterPendingPaymentRequest;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn register_pending_payment(
    State(state): State<AppState>,
    Json(req): Json<RegisterPendingPaymentRequest>,
) -> impl IntoResponse {
    match state.pending_payment_service.register(req).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn get_pending_payment(
    State(state): State<AppState>,
    Path(integration_id): Path<String>,
) -> impl IntoResponse {
    match state.pending_payment_service.get(&integration_id).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
