//! HTTP Middleware
//!
//! Response post-processing shared by every route: CORS headers and status
//! logging.

use http::{Method, StatusCode};
use std::collections::HashMap;

use super::response::Response;

/// Adds CORS headers. `Vary` and allowed methods go on every 200; the
/// origin is echoed back only when the request carried one.
pub fn apply_cors(mut response: Response, request_headers: &HashMap<String, String>) -> Response {
    if response.status == StatusCode::OK {
        response = response
            .with_header("Vary", "Origin")
            .with_header("Access-Control-Allow-Methods", "GET, POST");
    }
    if let Some(origin) = request_headers.get("Origin") {
        response = response.with_header("Access-Control-Allow-Origin", origin.clone());
    }
    response
}

/// HTTP 状态码错误日志
///
/// 4xx logs at warn, 5xx at error, everything else at debug.
pub fn log_status(method: &Method, path: &str, status: StatusCode) {
    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            "HTTP client error"
        );
    } else {
        tracing::debug!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            "HTTP request served"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_on_ok_with_origin() {
        let headers = HashMap::from([("Origin".to_string(), "http://localhost:3000".to_string())]);
        let response = apply_cors(Response::html("ok"), &headers);

        assert_eq!(
            response.header("Access-Control-Allow-Origin"),
            Some("http://localhost:3000")
        );
        assert_eq!(response.header("Vary"), Some("Origin"));
        assert_eq!(response.header("Access-Control-Allow-Methods"), Some("GET, POST"));
    }

    #[test]
    fn test_no_origin_no_allow_origin() {
        let response = apply_cors(Response::html("ok"), &HashMap::new());
        assert_eq!(response.header("Access-Control-Allow-Origin"), None);
        assert_eq!(response.header("Vary"), Some("Origin"));
    }

    #[test]
    fn test_errors_only_echo_origin() {
        let headers = HashMap::from([("Origin".to_string(), "http://a".to_string())]);
        let error = Response::new(StatusCode::FORBIDDEN, crate::infrastructure::http::response::JSON, "{}");
        let response = apply_cors(error, &headers);

        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("http://a"));
        assert_eq!(response.header("Vary"), None);
    }
}
