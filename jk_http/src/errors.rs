use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use thiserror::Error;

/// Wait applied to a 429 response without a usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

const BAD_REQUEST_MESSAGE: &str = "Invalid request. Please check parameters.";
const NOT_FOUND_MESSAGE: &str = "The requested resource was not found.";
const RATE_LIMITED_MESSAGE: &str = "Rate limited. Please wait before retrying.";
const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
const SERVICE_UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again later.";
const NETWORK_MESSAGE: &str = "Network error. Please check your connection.";
const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
const DECODE_MESSAGE: &str = "The response did not match the expected format.";
const MAX_RETRIES_MESSAGE: &str = "Maximum retry attempts exceeded.";
const CANCELLED_MESSAGE: &str = "The request was cancelled.";

/// Failure of one logical request
///
/// This is a closed set: callers match on the variant rather than inspecting
/// messages. Values are plain data, so classifying the same response twice
/// yields equal errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Bad request: {}", or_default(.message, BAD_REQUEST_MESSAGE))]
    BadRequest { message: Option<String> },

    #[error("Not found: {}", or_default(.message, NOT_FOUND_MESSAGE))]
    NotFound { message: Option<String> },

    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64, message: Option<String> },

    #[error("Upstream server error: {}", or_default(.message, SERVER_ERROR_MESSAGE))]
    ServerError { message: Option<String>, report_url: Option<String> },

    #[error("Service unavailable: {}", or_default(.message, SERVICE_UNAVAILABLE_MESSAGE))]
    ServiceUnavailable { message: Option<String> },

    #[error("Network error: {cause}")]
    Network { cause: String },

    #[error("Timeout after {after:?}")]
    Timeout { after: Duration },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Maximum retry attempts exceeded after {attempts} dispatches")]
    MaxRetriesExceeded { attempts: u32 },

    #[error("Request cancelled")]
    Cancelled,

    #[error("HTTP error {status}: {}", or_default(.message, "unexpected response"))]
    Unknown { status: u16, error_type: Option<String>, message: Option<String> },
}

/// How the retry loop treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    /// Returned to the caller as-is
    Terminal,
    /// Retried with linear backoff, consuming one attempt
    Budgeted,
    /// Retried after the upstream's wait, without consuming an attempt
    RateLimit { retry_after_secs: u64 },
}

impl ApiError {
    /// Original HTTP status, 0 for failures that never produced a response
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::NotFound { .. } => 404,
            ApiError::RateLimited { .. } => 429,
            ApiError::ServerError { .. } => 500,
            ApiError::ServiceUnavailable { .. } => 503,
            ApiError::Unknown { status, .. } => *status,
            ApiError::Network { .. }
            | ApiError::Timeout { .. }
            | ApiError::Decode(_)
            | ApiError::MaxRetriesExceeded { .. }
            | ApiError::Cancelled => 0,
        }
    }

    /// Machine-readable error type, matching the upstream's exception names where it has one
    pub fn error_type(&self) -> &str {
        match self {
            ApiError::BadRequest { .. } => "BadRequestException",
            ApiError::NotFound { .. } => "BadResponseException",
            ApiError::RateLimited { .. } => "RateLimitException",
            ApiError::ServerError { .. } => "InternalException",
            ApiError::ServiceUnavailable { .. } => "ServiceUnavailableException",
            ApiError::Network { .. } => "NetworkError",
            ApiError::Timeout { .. } => "TimeoutError",
            ApiError::Decode(_) => "DecodeError",
            ApiError::MaxRetriesExceeded { .. } => "MaxRetriesExceeded",
            ApiError::Cancelled => "Cancelled",
            ApiError::Unknown { error_type, .. } => error_type.as_deref().unwrap_or("UnknownError"),
        }
    }

    /// Message supplied by the upstream in the error body, if any
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest { message }
            | ApiError::NotFound { message }
            | ApiError::RateLimited { message, .. }
            | ApiError::ServerError { message, .. }
            | ApiError::ServiceUnavailable { message }
            | ApiError::Unknown { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Human-readable message: the upstream's when present, otherwise a default per kind
    pub fn message(&self) -> String {
        if let Some(message) = self.upstream_message() {
            return message.to_string();
        }

        match self {
            ApiError::BadRequest { .. } => BAD_REQUEST_MESSAGE.to_string(),
            ApiError::NotFound { .. } => NOT_FOUND_MESSAGE.to_string(),
            ApiError::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            ApiError::ServerError { .. } => SERVER_ERROR_MESSAGE.to_string(),
            ApiError::ServiceUnavailable { .. } => SERVICE_UNAVAILABLE_MESSAGE.to_string(),
            ApiError::Network { .. } => NETWORK_MESSAGE.to_string(),
            ApiError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            ApiError::Decode(_) => DECODE_MESSAGE.to_string(),
            ApiError::MaxRetriesExceeded { .. } => MAX_RETRIES_MESSAGE.to_string(),
            ApiError::Cancelled => CANCELLED_MESSAGE.to_string(),
            ApiError::Unknown { status, .. } => format!("HTTP error {status}"),
        }
    }

    /// Seconds the upstream asked us to wait, for rate-limit errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::RateLimited { retry_after_secs, .. } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }

    /// Upstream-provided URL for reporting an internal error
    pub fn report_url(&self) -> Option<&str> {
        match self {
            ApiError::ServerError { report_url, .. } => report_url.as_deref(),
            _ => None,
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            ApiError::RateLimited { retry_after_secs, .. } => RetryClass::RateLimit { retry_after_secs: *retry_after_secs },
            ApiError::ServerError { .. } | ApiError::ServiceUnavailable { .. } | ApiError::Timeout { .. } | ApiError::Network { .. } => {
                RetryClass::Budgeted
            }
            ApiError::Unknown { status, .. } if *status >= 500 => RetryClass::Budgeted,
            _ => RetryClass::Terminal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.retry_class() != RetryClass::Terminal
    }
}

fn or_default<'a>(message: &'a Option<String>, default: &'a str) -> &'a str {
    message.as_deref().unwrap_or(default)
}

/// A 2xx payload that failed schema validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Failure while constructing a client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Upstream error body: `{ "message"?, "error"?, "type"?, "report_url"? }`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    report_url: Option<String>,
}

impl ErrorBody {
    fn parse(body: Option<&[u8]>) -> Self {
        body.and_then(|bytes| serde_json::from_slice(bytes).ok()).unwrap_or_default()
    }
}

/// Map a non-2xx upstream response onto an [`ApiError`]
///
/// Pure function of its inputs. An unparseable body is treated as absent.
pub fn classify(status: u16, headers: &HeaderMap, body: Option<&[u8]>) -> ApiError {
    let body = ErrorBody::parse(body);
    let message = body.message.or(body.error);

    match status {
        400 => ApiError::BadRequest { message },
        404 => ApiError::NotFound { message },
        429 => ApiError::RateLimited { retry_after_secs: parse_retry_after(headers), message },
        500 => ApiError::ServerError { message, report_url: body.report_url },
        503 => ApiError::ServiceUnavailable { message },
        _ => ApiError::Unknown { status, error_type: body.error_type, message },
    }
}

/// `Retry-After` in whole seconds, falling back to the default when missing or not an integer
pub fn parse_retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use reqwest::header::HeaderValue;

    use super::*;

    fn retry_after(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_status_mapping() {
        let headers = HeaderMap::new();
        assert!(matches!(classify(400, &headers, None), ApiError::BadRequest { message: None }));
        assert!(matches!(classify(404, &headers, None), ApiError::NotFound { message: None }));
        assert!(matches!(classify(429, &headers, None), ApiError::RateLimited { retry_after_secs: 2, .. }));
        assert!(matches!(classify(500, &headers, None), ApiError::ServerError { report_url: None, .. }));
        assert!(matches!(classify(503, &headers, None), ApiError::ServiceUnavailable { .. }));
        assert!(matches!(classify(418, &headers, None), ApiError::Unknown { status: 418, .. }));
    }

    #[test]
    fn test_retry_after_header() {
        assert_eq!(parse_retry_after(&retry_after("3")), 3);
        assert_eq!(parse_retry_after(&retry_after(" 10 ")), 10);
        assert_eq!(parse_retry_after(&retry_after("soon")), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(parse_retry_after(&retry_after("-1")), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(parse_retry_after(&HeaderMap::new()), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_body_fields_are_extracted() {
        let body = br#"{"status":500,"type":"InternalException","message":"Jikan failed","report_url":"https://github.com/jikan-me/jikan-rest/issues/new"}"#;
        let error = classify(500, &HeaderMap::new(), Some(body));

        assert_eq!(error.upstream_message(), Some("Jikan failed"));
        assert_eq!(error.report_url(), Some("https://github.com/jikan-me/jikan-rest/issues/new"));
        assert_eq!(error.status(), 500);
        assert_eq!(error.error_type(), "InternalException");
    }

    #[test]
    fn test_error_field_is_message_fallback() {
        let error = classify(404, &HeaderMap::new(), Some(br#"{"error":"Resource does not exist"}"#));
        assert_eq!(error.message(), "Resource does not exist");
    }

    #[test]
    fn test_unknown_uses_body_type() {
        let error = classify(403, &HeaderMap::new(), Some(br#"{"type":"ForbiddenException"}"#));
        assert_eq!(error.error_type(), "ForbiddenException");
        assert_eq!(error.message(), "HTTP error 403");

        let error = classify(403, &HeaderMap::new(), None);
        assert_eq!(error.error_type(), "UnknownError");
    }

    #[test]
    fn test_unparseable_body_is_ignored() {
        let error = classify(400, &HeaderMap::new(), Some(b"<html>bad gateway</html>"));
        assert_eq!(error, ApiError::BadRequest { message: None });
        assert_eq!(error.message(), BAD_REQUEST_MESSAGE);
    }

    #[test]
    fn test_non_http_failures_have_zero_status() {
        assert_eq!(ApiError::Timeout { after: Duration::from_secs(10) }.status(), 0);
        assert_eq!(ApiError::Network { cause: "dns".into() }.status(), 0);
        assert_eq!(ApiError::Decode(DecodeError::new("missing field `data`")).status(), 0);
        assert_eq!(ApiError::Cancelled.status(), 0);
    }

    #[test]
    fn test_retry_classes() {
        let headers = retry_after("3");
        assert_eq!(classify(429, &headers, None).retry_class(), RetryClass::RateLimit { retry_after_secs: 3 });
        assert_eq!(classify(500, &headers, None).retry_class(), RetryClass::Budgeted);
        assert_eq!(classify(502, &headers, None).retry_class(), RetryClass::Budgeted);
        assert_eq!(classify(503, &headers, None).retry_class(), RetryClass::Budgeted);
        assert_eq!(classify(400, &headers, None).retry_class(), RetryClass::Terminal);
        assert_eq!(classify(404, &headers, None).retry_class(), RetryClass::Terminal);
        assert_eq!(classify(401, &headers, None).retry_class(), RetryClass::Terminal);
        assert!(ApiError::Timeout { after: Duration::from_secs(1) }.is_retryable());
        assert!(ApiError::Network { cause: "reset".into() }.is_retryable());
        assert!(!ApiError::Decode(DecodeError::new("x")).is_retryable());
        assert!(!ApiError::MaxRetriesExceeded { attempts: 3 }.is_retryable());
        assert!(!ApiError::Cancelled.is_retryable());
    }

    #[test]
    fn test_display_uses_default_message() {
        assert_eq!(ApiError::NotFound { message: None }.to_string(), format!("Not found: {NOT_FOUND_MESSAGE}"));
        assert_eq!(ApiError::NotFound { message: Some("gone".into()) }.to_string(), "Not found: gone");
    }

    proptest! {
        #[test]
        fn classify_is_idempotent(status in 100u16..600, retry in proptest::option::of(0u64..10_000), message in proptest::option::of("[a-zA-Z ]{0,40}")) {
            let mut headers = HeaderMap::new();
            if let Some(secs) = retry {
                headers.insert(RETRY_AFTER, HeaderValue::from(secs));
            }
            let body = message.map(|m| serde_json::json!({ "message": m }).to_string());
            let body = body.as_deref().map(str::as_bytes);

            prop_assert_eq!(classify(status, &headers, body), classify(status, &headers, body));
        }

        #[test]
        fn classify_preserves_status(status in 300u16..600) {
            let error = classify(status, &HeaderMap::new(), None);
            prop_assert_eq!(error.status(), status);
        }
    }
}
