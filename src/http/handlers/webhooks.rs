use crate::service::reconciler::{InboundWebhook, WebhookAck};
use crate::AppState;
use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;

pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

pub async fn receive_gateway_webhook(
    State(state): State<AppState>,
    method: Method,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Body,
) -> impl IntoResponse {
    let remote_address = remote_address(&headers, peer.map(|ConnectInfo(addr)| addr));

    let body = match tokio::time::timeout(
        state.webhook_read_timeout,
        axum::body::to_bytes(body, MAX_WEBHOOK_BODY_BYTES),
    )
    .await
    {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "timed out after {}s",
            state.webhook_read_timeout.as_secs()
        )),
    };

    state
        .reconciler
        .handle(InboundWebhook {
            method,
            remote_address,
            headers,
            body,
        })
        .await
}

impl IntoResponse for WebhookAck {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

fn remote_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|addr| addr.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}
