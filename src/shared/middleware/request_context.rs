use axum::{extract::Request, middleware::Next, response::Response};
use tracing::Instrument;
use uuid::Uuid;

/// Identifier attached to every inbound request, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

pub async fn attach_request_id(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    request.extensions_mut().insert(RequestId(request_id));

    let span = tracing::info_span!(
        "interaction_request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    next.run(request).instrument(span).await
}
