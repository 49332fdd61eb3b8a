use crate::tracing::RequestId;
use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Header carrying the request id on both requests and responses
pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn stamp(headers: &mut HeaderMap, request_id: &RequestId) {
    let value = HeaderValue::from_str(request_id.as_str())
        .unwrap_or(HeaderValue::from_static("unknown"));
    headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
}

/// Adopts the caller's `x-request-id` or mints a fresh one, then threads it
/// through the task-local scope so response metadata and error payloads can
/// pick it up without explicit plumbing.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(RequestId::new)
        .unwrap_or_default();

    stamp(request.headers_mut(), &request_id);
    request.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.as_str(),
        method = %request.method(),
        uri = %request.uri(),
    );
    let _guard = span.enter();

    let mut response = crate::tracing::scope_request_id(request_id.clone(), async move {
        next.run(request).await
    })
    .await;

    stamp(response.headers_mut(), &request_id);
    response
}
