//! HTTP Request Parser
//!
//! Turns the raw request text read off a socket into a [`Request`]. Only the
//! subset of HTTP/1.x the ledger needs: one request per connection, no
//! chunked bodies, no continuation lines.

use http::{Method, Version};
use std::collections::HashMap;
use thiserror::Error;

/// Methods accepted on the request line. Anything else is malformed.
const ALLOWED_METHODS: [&str; 8] = [
    "OPTIONS", "GET", "HEAD", "POST", "PUT", "DELETE", "TRACE", "CONNECT",
];

/// Request parse / framing errors. All of them map to 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request is empty.")]
    Empty,

    #[error("Invalid request line syntax")]
    InvalidRequestLine,

    #[error("Missing mandatory CRLF.")]
    MissingSeparator,

    #[error("Malformed HTTP header: {0}")]
    MalformedHeader(String),

    #[error("Request is not valid UTF-8 after decoding")]
    InvalidEncoding,

    #[error("No query to process.")]
    EmptyQuery,

    #[error("Malformed query parameter(s). This app supports only <key>=<value> parameter form.")]
    MalformedParam,

    #[error("Request exceeds {0} bytes")]
    TooLarge(usize),

    #[error("Invalid Content-Length header")]
    InvalidContentLength,
}

/// A parsed request.
///
/// `headers` keeps names exactly as sent; a repeated name keeps its last value.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Decoded resource, query string included.
    pub target: String,
    pub version: Version,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Request {
    pub fn parse(text: &str) -> Result<Self, RequestError> {
        let lines: Vec<&str> = text.lines().collect();
        let Some(request_line) = lines.first() else {
            return Err(RequestError::Empty);
        };

        let (method, raw_target, version) = parse_request_line(request_line)?;
        let target = decode_plus(raw_target)?;

        // <request line> <headers> <blank> <body>; headers and body are optional
        let separator = lines
            .iter()
            .skip(1)
            .position(|line| line.is_empty())
            .map(|i| i + 1)
            .ok_or(RequestError::MissingSeparator)?;

        let mut headers = HashMap::new();
        for line in &lines[1..separator] {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| RequestError::MalformedHeader(line.to_string()))?;
            let value = value.trim();
            if value.is_empty() {
                return Err(RequestError::MalformedHeader(line.to_string()));
            }
            let name = decode_percent(name.trim())?;
            let value = decode_plus(value)?;
            // Decoded line breaks would end the header early if echoed back.
            if name.contains(['\r', '\n']) || value.contains(['\r', '\n']) {
                return Err(RequestError::MalformedHeader(line.to_string()));
            }
            headers.insert(name, value);
        }

        let body = decode_plus(&lines[separator + 1..].join("\n"))?;

        Ok(Self {
            method,
            target,
            version,
            headers,
            body,
        })
    }

    /// Resource without its query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Text after the first `?`, empty when there is none.
    pub fn query(&self) -> &str {
        self.target.split_once('?').map_or("", |(_, query)| query)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

fn parse_request_line(line: &str) -> Result<(Method, &str, Version), RequestError> {
    let mut parts = line.split(' ');
    let (Some(method), Some(target), Some(protocol), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(RequestError::InvalidRequestLine);
    };

    if !ALLOWED_METHODS.contains(&method) {
        return Err(RequestError::InvalidRequestLine);
    }
    if target.is_empty() || target.chars().any(char::is_whitespace) {
        return Err(RequestError::InvalidRequestLine);
    }
    let version = match protocol {
        "HTTP/1.0" => Version::HTTP_10,
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/2.0" => Version::HTTP_2,
        _ => return Err(RequestError::InvalidRequestLine),
    };
    let method = Method::from_bytes(method.as_bytes()).map_err(|_| RequestError::InvalidRequestLine)?;

    Ok((method, target, version))
}

fn decode_percent(s: &str) -> Result<String, RequestError> {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RequestError::InvalidEncoding)
}

/// Form-style decoding: `+` is a space, then percent escapes.
fn decode_plus(s: &str) -> Result<String, RequestError> {
    decode_percent(&s.replace('+', " "))
}

/// Splits `key=value&key=value` text that has already been decoded.
///
/// Later duplicates win. A value may itself contain `=`.
pub fn parse_form(text: &str) -> Result<HashMap<String, String>, RequestError> {
    if text.is_empty() {
        return Err(RequestError::EmptyQuery);
    }
    text.split('&')
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or(RequestError::MalformedParam)
        })
        .collect()
}

/// Where the header block ends in a raw byte buffer, and where the body starts.
pub fn header_terminator(buf: &[u8]) -> Option<usize> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// `Content-Length` from a raw header block; 0 when absent.
pub fn content_length(head: &str) -> Result<usize, RequestError> {
    for line in head.lines().skip(1) {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value
                    .trim()
                    .parse()
                    .map_err(|_| RequestError::InvalidContentLength);
            }
        }
    }
    Ok(0)
}
