//! Transport seam and client selection

use crate::config::ClientConfig;
use crate::error::{BoxError, HttpError, HttpResult};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Anything that can send a request and hand back a response.
///
/// `reqwest::Client` is the production implementation; tests plug in fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, BoxError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn send(&self, request: reqwest::Request) -> Result<reqwest::Response, BoxError> {
        self.execute(request).await.map_err(Into::into)
    }
}

/// Pick the transport for one dispatch.
///
/// A caller-supplied transport wins outright and `proxy_url`/`timeout` are
/// ignored. Otherwise a fresh `reqwest::Client` is built from `config`.
pub(crate) fn select(
    custom: Option<&Arc<dyn Transport>>,
    proxy_url: Option<&str>,
    timeout: Option<Duration>,
    config: &ClientConfig,
) -> HttpResult<Arc<dyn Transport>> {
    if let Some(transport) = custom {
        return Ok(Arc::clone(transport));
    }

    let timeout = config.effective_timeout(timeout);
    let mut builder = config.client_builder().timeout(timeout);

    if let Some(proxy_url) = proxy_url.filter(|p| !p.is_empty()) {
        let parsed = url::Url::parse(proxy_url)
            .map_err(|e| HttpError::ProxyParseFailed(format!("{}: {}", proxy_url, e)))?;
        let proxy = reqwest::Proxy::all(parsed)
            .map_err(|e| HttpError::ProxyParseFailed(e.to_string()))?;
        builder = builder.proxy(proxy);
        tracing::debug!(proxy = proxy_url, "routing through proxy");
    }

    let client = builder.build().map_err(HttpError::ClientBuildFailed)?;
    tracing::debug!(timeout_ms = timeout.as_millis() as u64, "built http client");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    #[async_trait]
    impl Transport for Refusing {
        async fn send(&self, _: reqwest::Request) -> Result<reqwest::Response, BoxError> {
            Err("refused".into())
        }
    }

    #[test]
    fn test_custom_transport_ignores_proxy() {
        let custom: Arc<dyn Transport> = Arc::new(Refusing);
        let selected = select(
            Some(&custom),
            Some("::not a url::"),
            None,
            &ClientConfig::default(),
        )
        .unwrap();
        assert!(Arc::ptr_eq(&selected, &custom));
    }

    #[test]
    fn test_malformed_proxy() {
        let result = select(None, Some("://missing-scheme"), None, &ClientConfig::default());
        assert!(matches!(result, Err(HttpError::ProxyParseFailed(_))));
    }

    #[test]
    fn test_builds_client_with_proxy() {
        let result = select(
            None,
            Some("http://proxy.local:3128"),
            Some(Duration::from_secs(1)),
            &ClientConfig::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_builds_default_client() {
        assert!(select(None, None, None, &ClientConfig::default()).is_ok());
    }
}
