use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::controller::discord::pipeline::{InboundRequest, OutboundResponse};
use crate::shared::middleware::request_context::RequestId;
use crate::shared::structs::AppState;
use crate::shared::{SIGNATURE_HEADER, TIMESTAMP_HEADER};

pub async fn handle_interaction(
    State(app_state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::info!(%request_id, bytes = body.len(), "Processing request");

    let request = InboundRequest {
        body,
        signature: header_value(&headers, SIGNATURE_HEADER),
        timestamp: header_value(&headers, TIMESTAMP_HEADER),
        request_id,
    };

    app_state.pipeline.handle(request).await.into_response()
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
        .unwrap_or_default()
}

impl IntoResponse for OutboundResponse {
    fn into_response(self) -> Response {
        if self.body.is_empty() {
            self.status.into_response()
        } else {
            (
                self.status,
                [(header::CONTENT_TYPE, "application/json")],
                self.body,
            )
                .into_response()
        }
    }
}
