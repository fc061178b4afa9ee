//! Request ID propagation for log correlation across a session's lifetime.
//! Grounded on `pp_server/src/api/request_id.rs`.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

fn get_or_generate(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Stamps every request/response pair with an `x-request-id`, generating one
/// when the caller didn't supply it, so a session's log lines can be
/// correlated across `GetState`/`GetHistory`/control calls.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = get_or_generate(request.headers());
    log::debug!("request_id={request_id} {} {}", request.method(), request.uri());
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
