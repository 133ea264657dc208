//! HTTP request methods and the method validation gate.

use crate::error::{HttpError, HttpResult};
use std::fmt;
use std::str::FromStr;

/// HTTP request methods accepted by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Connect,
    Trace,
}

impl HttpMethod {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
        }
    }

    /// Validate a raw method string.
    ///
    /// Matching is exact: `"get"` is rejected the same way `"test"` is.
    pub fn validate(method: &str) -> HttpResult<Self> {
        match method {
            "" => Err(HttpError::EmptyMethod),
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "CONNECT" => Ok(Self::Connect),
            "TRACE" => Ok(Self::Trace),
            other => Err(HttpError::UnknownMethod(other.to_string())),
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Connect => reqwest::Method::CONNECT,
            Self::Trace => reqwest::Method::TRACE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Connect.as_str(), "CONNECT");
        assert_eq!(HttpMethod::Trace.as_str(), "TRACE");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_validate_accepts_full_set() {
        for name in [
            "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "CONNECT", "TRACE", "PATCH",
        ] {
            let method = HttpMethod::validate(name).unwrap();
            assert_eq!(method.as_str(), name);
            assert_eq!(method.to_reqwest().as_str(), name);
        }
    }

    #[test]
    fn test_validate_empty() {
        assert!(matches!(HttpMethod::validate(""), Err(HttpError::EmptyMethod)));
    }

    #[test]
    fn test_validate_unknown() {
        assert!(matches!(
            HttpMethod::validate("test"),
            Err(HttpError::UnknownMethod(m)) if m == "test"
        ));
        assert!(matches!(
            "get".parse::<HttpMethod>(),
            Err(HttpError::UnknownMethod(_))
        ));
    }
}
