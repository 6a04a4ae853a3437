//! Error taxonomy for backend API calls.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of API failures for consistent caller-side handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Network unreachable or the connection failed outright
    Connection,
    /// Request exceeded the configured deadline
    Timeout,
    /// Login rejected: 401 on a public path, or a 2xx login with no token
    InvalidCredentials,
    /// Backend validation failure (4xx other than 401)
    MalformedRequest,
    /// 401 on an authenticated call; the stored session has been cleared
    SessionExpired,
    /// Persisted session data failed to parse
    CorruptState,
    /// A 2xx response body failed to decode
    Parse,
    /// Any other HTTP status, passed through with status and body
    HttpStatus,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Connection => write!(f, "connection"),
            ApiErrorKind::Timeout => write!(f, "timeout"),
            ApiErrorKind::InvalidCredentials => write!(f, "invalid_credentials"),
            ApiErrorKind::MalformedRequest => write!(f, "malformed_request"),
            ApiErrorKind::SessionExpired => write!(f, "session_expired"),
            ApiErrorKind::CorruptState => write!(f, "corrupt_state"),
            ApiErrorKind::Parse => write!(f, "parse"),
            ApiErrorKind::HttpStatus => write!(f, "http_status"),
        }
    }
}

/// Structured error from a backend call with kind and details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates a pass-through error for a status outside the mapped cases.
    pub fn http_status(status: u16, body: &str) -> Self {
        let message = match body_message(body) {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };
        Self {
            kind: ApiErrorKind::HttpStatus,
            message,
            details: non_empty(body),
        }
    }

    /// Creates a backend-validation error, surfacing the backend message
    /// when the body carries one.
    pub fn malformed_request(status: u16, body: &str) -> Self {
        let message = match body_message(body) {
            Some(msg) => msg,
            None => format!("HTTP {status}"),
        };
        Self {
            kind: ApiErrorKind::MalformedRequest,
            message,
            details: non_empty(body),
        }
    }

    /// Creates a rejected-login error.
    pub fn invalid_credentials(body: &str) -> Self {
        let message = body_message(body).unwrap_or_else(|| "Invalid credentials".to_string());
        Self {
            kind: ApiErrorKind::InvalidCredentials,
            message,
            details: non_empty(body),
        }
    }

    /// Creates the error raised after the 401 interceptor has already
    /// cleared the stored session.
    pub fn session_expired() -> Self {
        Self::new(ApiErrorKind::SessionExpired, "Session expired")
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Timeout, message)
    }

    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Connection, message)
    }

    /// Creates a corrupt-local-state error.
    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::CorruptState, message)
    }

    /// Creates a response-decode error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Parse, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for backend operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Extracts a display message from a backend JSON error body.
///
/// The backend is inconsistent about the key: some endpoints answer
/// `{"message": ...}`, others `{"erro": ...}`.
fn body_message(body: &str) -> Option<String> {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(msg) = json
            .get("message")
            .or_else(|| json.get("erro"))
            .and_then(Value::as_str)
    {
        return Some(msg.to_string());
    }
    None
}

fn non_empty(body: &str) -> Option<String> {
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: `http_status` surfaces a `message` key from the body.
    #[test]
    fn test_http_status_extracts_message() {
        let err = ApiError::http_status(500, r#"{"message":"database offline"}"#);
        assert_eq!(err.kind, ApiErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 500: database offline");
        assert!(err.details.is_some());
    }

    /// Test: the Portuguese `erro` key is recognized too.
    #[test]
    fn test_malformed_request_extracts_erro_key() {
        let err = ApiError::malformed_request(400, r#"{"erro":"email ja cadastrado"}"#);
        assert_eq!(err.kind, ApiErrorKind::MalformedRequest);
        assert_eq!(err.message, "email ja cadastrado");
    }

    /// Test: a non-JSON body falls back to the status line and keeps the
    /// raw body as details.
    #[test]
    fn test_malformed_request_non_json_body() {
        let err = ApiError::malformed_request(400, "<html>bad request</html>");
        assert_eq!(err.message, "HTTP 400");
        assert_eq!(err.details.as_deref(), Some("<html>bad request</html>"));
    }

    /// Test: an empty body yields no details.
    #[test]
    fn test_http_status_empty_body() {
        let err = ApiError::http_status(503, "");
        assert_eq!(err.message, "HTTP 503");
        assert!(err.details.is_none());
    }

    /// Test: `Display` renders the summary line; kinds render snake_case.
    #[test]
    fn test_display_impls() {
        let err = ApiError::invalid_credentials("");
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(ApiErrorKind::SessionExpired.to_string(), "session_expired");
        assert_eq!(
            ApiErrorKind::InvalidCredentials.to_string(),
            "invalid_credentials"
        );
    }
}
