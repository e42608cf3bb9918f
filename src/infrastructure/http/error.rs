//! HTTP Error Handling

use http::StatusCode;
use serde::Serialize;

use super::request::RequestError;
use super::response::{Response, JSON};
use crate::application::{ApplicationError, SessionError};

const GENERIC_FAILURE: &str = "A runtime error occurred. Try again.";

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub reason: &'static str,
    pub message: String,
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request or ill-formed parameters
    BadRequest(String),
    /// No usable session. `expired` asks the client to drop its cookie.
    Unauthorized { message: String, expired: bool },
    Forbidden(String),
    /// Business rule rejected the input; sent as 200 with an embedded 400.
    Validation(String),
    NotFound(String),
    TooManyRequests,
    NotImplemented,
    /// Persisted state disagrees with what was written
    Integrity(String),
    ServiceUnavailable(String),
    /// Detail is logged, never sent.
    Internal(String),
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized {
            message: "Login required".to_string(),
            expired: false,
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound("Invalid resource.".to_string())
    }

    /// Status line of the response.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::OK,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            ApiError::Integrity(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Status code reported inside the JSON body.
    fn code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            other => other.status(),
        }
    }

    /// Whether the client's session cookie should be cleared.
    pub fn clears_session(&self) -> bool {
        matches!(self, ApiError::Unauthorized { expired: true, .. })
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized { message: msg, .. }
            | ApiError::Forbidden(msg)
            | ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::TooManyRequests => "Too many requests. Try again later.",
            ApiError::NotImplemented => "That method is not supported.",
            ApiError::Integrity(_) | ApiError::Internal(_) => GENERIC_FAILURE,
        }
    }

    fn log(&self) {
        let code = self.code().as_u16();
        match self {
            ApiError::Integrity(detail) => {
                tracing::error!(code, error = %detail, "Integrity check failed")
            }
            ApiError::Internal(detail) => {
                tracing::error!(code, error = %detail, "Internal server error")
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(code, error = %msg, "Service unavailable")
            }
            ApiError::Validation(msg) => {
                tracing::info!(code, error = %msg, "Validation failed")
            }
            other => tracing::warn!(code, error = %other.message(), "Request rejected"),
        }
    }

    pub fn into_response(self) -> Response {
        self.log();
        let code = self.code();
        let body = ErrorResponse {
            code: code.as_u16(),
            reason: code.canonical_reason().unwrap_or("Error"),
            message: sanitize(self.message()),
        };
        // A three-field struct of plain strings always serialises.
        let body = serde_json::to_string_pretty(&body).unwrap_or_default();
        Response::new(self.status(), JSON, body)
    }
}

/// HTML-escapes `& < > " '` so messages are inert when rendered.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound => ApiError::unauthorized(),
            SessionError::Expired => ApiError::Unauthorized {
                message: "Login required.".to_string(),
                expired: true,
            },
            SessionError::Persistence(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Validation(msg) => ApiError::Validation(msg),
            ApplicationError::Forbidden(msg) => ApiError::Forbidden(msg),
            ApplicationError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            ApplicationError::InvalidCredentials => ApiError::Forbidden(e.to_string()),
            ApplicationError::Integrity { .. } => ApiError::Integrity(e.to_string()),
            ApplicationError::ResourceExhausted(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::Repository(e) => ApiError::Internal(e.to_string()),
            ApplicationError::Session(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}
