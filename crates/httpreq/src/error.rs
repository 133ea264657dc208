//! HTTP error types and handling

use thiserror::Error;

/// Boxed cause returned by a [`Transport`](crate::transport::Transport)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while assembling or dispatching a request
#[derive(Error, Debug)]
pub enum HttpError {
    /// Method was never set
    #[error("request method is not set")]
    EmptyMethod,

    /// Method outside the supported set
    #[error("unknown request method: {0}")]
    UnknownMethod(String),

    /// URL has placeholders but no values were passed
    #[error("no path param value passed")]
    NoPathParamValue,

    /// Placeholder count differs from the number of values passed
    #[error("not enough path parameter values passed: url has {placeholders} placeholders, got {supplied} values")]
    PathParamCountMismatch { placeholders: usize, supplied: usize },

    /// Substitution consumed a different number of values than were passed
    #[error("path parameter placeholder and actual values count doesn't match: consumed {consumed} of {supplied}")]
    PathParamConflict { consumed: usize, supplied: usize },

    /// Structured body could not be encoded as JSON
    #[error("failed to marshal json request: {0}")]
    SerializationFailed(String),

    /// Underlying request object could not be built
    #[error("failed to create request: {0}")]
    RequestConstructionFailed(String),

    /// Proxy URL is malformed
    #[error("failed to parse proxy url: {0}")]
    ProxyParseFailed(String),

    /// Default client could not be constructed
    #[error("failed to build http client: {0}")]
    ClientBuildFailed(#[source] reqwest::Error),

    /// Encoded query string holds a malformed percent escape
    #[error("query unescape failed: {0}")]
    QueryUnescapeFailed(String),

    /// Transport-level failure
    #[error("dispatching request failed: {0}")]
    DispatchFailed(#[source] BoxError),

    /// Response body could not be read
    #[error("error reading body: {0}")]
    ResponseReadFailed(String),

    /// `dispatch_scan` was given no target
    #[error("response struct is nil")]
    NilResponseTarget,

    /// Response body is not valid JSON for the target type
    #[error("failed to decode {status} response: {source}")]
    DecodeFailed {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Error category for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorCategory {
    /// Caught by the pre-flight gate, before any I/O
    Validation,
    /// Invalid request construction (URL, headers, body, proxy, client)
    Request,
    /// Connection-related errors (DNS, TCP, TLS)
    Connection,
    /// Timeout errors
    Timeout,
    /// Response reading or decoding errors
    Response,
    /// Unknown/other errors
    Unknown,
}

impl HttpError {
    /// Categorize the error for reporting
    pub fn category(&self) -> HttpErrorCategory {
        match self {
            HttpError::EmptyMethod
            | HttpError::UnknownMethod(_)
            | HttpError::NoPathParamValue
            | HttpError::PathParamCountMismatch { .. }
            | HttpError::PathParamConflict { .. }
            | HttpError::NilResponseTarget => HttpErrorCategory::Validation,
            HttpError::SerializationFailed(_)
            | HttpError::RequestConstructionFailed(_)
            | HttpError::ProxyParseFailed(_)
            | HttpError::ClientBuildFailed(_)
            | HttpError::QueryUnescapeFailed(_) => HttpErrorCategory::Request,
            HttpError::ResponseReadFailed(_) | HttpError::DecodeFailed { .. } => {
                HttpErrorCategory::Response
            }
            HttpError::DispatchFailed(cause) => match cause.downcast_ref::<reqwest::Error>() {
                Some(e) if e.is_timeout() => HttpErrorCategory::Timeout,
                Some(e) if e.is_connect() => HttpErrorCategory::Connection,
                Some(e) if e.is_request() || e.is_builder() => HttpErrorCategory::Request,
                _ => HttpErrorCategory::Unknown,
            },
        }
    }

    /// Whether the error was raised before any network I/O
    pub fn is_preflight(&self) -> bool {
        !matches!(
            self,
            HttpError::DispatchFailed(_)
                | HttpError::ResponseReadFailed(_)
                | HttpError::DecodeFailed { .. }
        )
    }

    /// Sanitize error message (remove sensitive info like credentials, internal IPs)
    pub fn sanitized_message(&self) -> String {
        let msg = self.to_string();
        sanitize_error_message(&msg)
    }
}

/// Sanitize error messages by removing sensitive information
pub(crate) fn sanitize_error_message(msg: &str) -> String {
    use regex::Regex;
    use std::sync::OnceLock;

    static URL_CREDS_RE: OnceLock<Regex> = OnceLock::new();
    static INTERNAL_IP_RE: OnceLock<Regex> = OnceLock::new();
    static AUTH_HEADER_RE: OnceLock<Regex> = OnceLock::new();

    let url_creds_re = URL_CREDS_RE
        .get_or_init(|| Regex::new(r"(https?)://[^@:/]+:[^@/]+@").expect("valid regex"));
    let internal_ip_re = INTERNAL_IP_RE.get_or_init(|| {
        Regex::new(r"\b(10\.\d+|172\.(1[6-9]|2[0-9]|3[01])|192\.168)\.\d+\.\d+\b")
            .expect("valid regex")
    });
    let auth_header_re = AUTH_HEADER_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(authorization:\s*(?:basic|bearer)|bearer|api[_-]?key|token)\b\s*[:=]?\s*[^\s&]+")
            .expect("valid regex")
    });

    let sanitized = url_creds_re.replace_all(msg, "$1://[REDACTED]@");
    let sanitized = internal_ip_re.replace_all(&sanitized, "[INTERNAL_IP]");
    let sanitized = auth_header_re.replace_all(&sanitized, "$1: [REDACTED]");

    sanitized.to_string()
}
