//! Authentication types

use base64::{engine::general_purpose, Engine as _};

/// Authentication types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// No authentication
    #[default]
    None,
    /// Basic authentication (username, password)
    Basic { username: String, password: String },
    /// Bearer token
    Bearer(String),
}

impl Auth {
    /// Value for the `Authorization` header, if this auth produces one.
    ///
    /// Basic auth is sent as soon as either half of the credentials is set.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Auth::None => None,
            Auth::Basic { username, password } if username.is_empty() && password.is_empty() => {
                None
            }
            Auth::Basic { username, password } => {
                Some(format!("Basic {}", basic_auth(username, password)))
            }
            Auth::Bearer(token) if token.is_empty() => None,
            Auth::Bearer(token) => Some(format!("Bearer {}", token)),
        }
    }
}

/// Standard base64 of `username:password`.
pub fn basic_auth(username: &str, password: &str) -> String {
    general_purpose::STANDARD.encode(format!("{}:{}", username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(username: &str, password: &str) -> Auth {
        Auth::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_basic_auth_encoding() {
        assert_eq!(basic_auth("foo", "bar"), "Zm9vOmJhcg==");
        assert_eq!(basic_auth("", "bar"), "OmJhcg==");
        assert_eq!(basic_auth("foo", ""), "Zm9vOg==");
        assert_eq!(basic_auth("", ""), "Og==");
    }

    #[test]
    fn test_header_when_either_half_is_set() {
        assert_eq!(basic("foo", "bar").header_value().as_deref(), Some("Basic Zm9vOmJhcg=="));
        assert_eq!(basic("", "bar").header_value().as_deref(), Some("Basic OmJhcg=="));
        assert_eq!(basic("foo", "").header_value().as_deref(), Some("Basic Zm9vOg=="));
    }

    #[test]
    fn test_no_header_for_empty_credentials() {
        assert_eq!(basic("", "").header_value(), None);
        assert_eq!(Auth::None.header_value(), None);
        assert_eq!(Auth::Bearer(String::new()).header_value(), None);
    }

    #[test]
    fn test_bearer() {
        assert_eq!(
            Auth::Bearer("token123".into()).header_value().as_deref(),
            Some("Bearer token123")
        );
    }
}
