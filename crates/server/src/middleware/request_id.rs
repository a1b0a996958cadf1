//! Request ID middleware for request tracing and correlation.
//!
//! An `x-request-id` supplied by the caller (the hosted backend forwards its
//! own when it calls the badge or email endpoints) is reused; otherwise a
//! UUID v4 is generated. The ID is recorded on the `http_request` span, set as
//! a Sentry tag and echoed in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Upper bound on a caller-supplied ID; longer values are replaced.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(usable_request_id)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    Span::current().record("request_id", request_id.as_str());

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn usable_request_id(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty() && trimmed.len() <= MAX_REQUEST_ID_LEN).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_request_id() {
        assert_eq!(usable_request_id(" abc-123 "), Some("abc-123"));
        assert_eq!(usable_request_id("   "), None);
        assert_eq!(usable_request_id(&"x".repeat(MAX_REQUEST_ID_LEN + 1)), None);
    }
}
