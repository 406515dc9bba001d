use crate::domain::pending_payment::err;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

pub async fn run_sweep(State(state): State<AppState>) -> impl IntoResponse {
    match state.sweep_job.sweep().await {
        Ok(cancelled) => {
            state.sweep_state.record(Utc::now(), cancelled);
            (StatusCode::OK, Json(serde_json::json!({ "cancelled": cancelled }))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(err("SWEEP_FAILED", &e.to_string())),
        )
            .into_response(),
    }
}

pub async fn sweep_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "running": state.sweep_state.is_running(),
        "last_run_at": state.sweep_state.last_run_at(),
        "last_cancelled": state.sweep_state.last_cancelled(),
    }))
}
