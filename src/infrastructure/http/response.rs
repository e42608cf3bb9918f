//! HTTP Response
//!
//! Every response closes the connection and carries an explicit length.

use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;

pub const JSON: &str = "application/json; charset=utf-8";
pub const HTML: &str = "text/html; charset=utf-8";
pub const CSS: &str = "text/css; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    /// Extra headers in send order (cookies, CORS).
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, HTML, body)
    }

    /// 200 with a pretty-printed JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            StatusCode::OK,
            JSON,
            serde_json::to_string_pretty(value)?,
        ))
    }

    /// Appends a header. A name or value that is not valid on the wire is
    /// dropped, so nothing can break out of its header line.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(&value).is_err()
        {
            tracing::warn!(header = %name.escape_debug(), "Dropping invalid response header");
            return self;
        }
        self.headers.push((name, value));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Wire form: status line, headers, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        head.push_str(&format!("Content-Type: {}\r\n", self.content_type));
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n");
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let response = Response::html("<p>hi</p>").with_header("Set-Cookie", "a=b");
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             Content-Length: 9\r\n\
             Connection: close\r\n\
             Set-Cookie: a=b\r\n\
             \r\n\
             <p>hi</p>"
        );
    }

    #[test]
    fn test_invalid_headers_are_dropped() {
        let response = Response::html("ok")
            .with_header("Access-Control-Allow-Origin", "http://a\r\nSet-Cookie: x=y")
            .with_header("Bad Name", "v")
            .with_header("Vary", "Origin");

        assert_eq!(response.headers, vec![("Vary".to_string(), "Origin".to_string())]);
        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert!(!text.contains("Set-Cookie"));
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let response = Response::html("é");
        let text = String::from_utf8(response.to_bytes()).unwrap();
        assert!(text.contains("Content-Length: 2\r\n"));
    }

    #[test]
    fn test_json_body() {
        let response = Response::json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(response.content_type, JSON);
        assert_eq!(response.body, "{\n  \"a\": 1\n}");
    }
}
