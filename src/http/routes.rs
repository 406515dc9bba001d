use crate::http::handlers::{audit, ops, pending_payments, sweep, webhooks};
use crate::http::middleware::admin_auth::require_internal_api_key;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{any, get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/pending-payments", post(pending_payments::register_pending_payment))
        .route(
            "/pending-payments/:integration_id",
            get(pending_payments::get_pending_payment),
        )
        .route("/webhooks/audit", get(audit::list_webhook_audit))
        .route("/sweep", post(sweep::run_sweep))
        .route("/sweep/status", get(sweep::sweep_status))
        .layer(from_fn_with_state(
            state.internal_api_key.clone(),
            require_internal_api_key,
        ));

    Router::new()
        .route("/health", get(ops::health))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .route("/webhooks/bold", any(webhooks::receive_gateway_webhook))
        .merge(admin_routes)
        .with_state(state)
}
