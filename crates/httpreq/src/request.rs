//! Request builder and the dispatch pipeline

use crate::auth::Auth;
use crate::body::RequestBody;
use crate::config::ClientConfig;
use crate::error::{HttpError, HttpResult};
use crate::method::HttpMethod;
use crate::response::{decode_json, HttpResponse};
use crate::transport::{self, Transport};
use crate::{path, query};
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Fluent builder for one HTTP call
///
/// Setters never validate; everything is checked when the request is
/// dispatched. Dispatch borrows the builder, so the same builder can be sent
/// again (or cloned and tweaked) without its URL template being rewritten.
///
/// ```ignore
/// use httpreq::RequestBuilder;
///
/// let user: User = RequestBuilder::new("GET", "https://api.example.com/users/:id")
///     .path_params(["42"])
///     .header("Accept", "application/json")
///     .basic_auth("admin", "secret")
///     .dispatch_json()
///     .await?;
/// ```
#[derive(Clone)]
pub struct RequestBuilder {
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) path_params: Vec<String>,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) query_params: HashMap<String, String>,
    pub(crate) unescape_query_params: bool,
    pub(crate) body: RequestBody,
    pub(crate) content_type: Option<String>,
    pub(crate) auth: Auth,
    pub(crate) timeout: Option<Duration>,
    pub(crate) proxy_url: Option<String>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) config: ClientConfig,
    pub(crate) verbose: bool,
}

impl RequestBuilder {
    /// Create a builder from a raw method name and URL template
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            path_params: Vec::new(),
            headers: HashMap::new(),
            query_params: HashMap::new(),
            unescape_query_params: false,
            body: RequestBody::None,
            content_type: None,
            auth: Auth::None,
            timeout: None,
            proxy_url: None,
            transport: None,
            config: ClientConfig::default(),
            verbose: false,
        }
    }

    /// Create a builder from a typed method
    pub fn with_method(method: HttpMethod, url: impl Into<String>) -> Self {
        Self::new(method.as_str(), url)
    }

    /// Raw method as set
    pub fn method(&self) -> &str {
        &self.method
    }

    /// URL template as set, placeholders included
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Use `client` instead of building one per dispatch
    ///
    /// Proxy and timeout settings are then ignored; configure them on the
    /// client itself.
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(Arc::new(client))
    }

    /// Use an arbitrary transport instead of building a client
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Defaults for the client built at dispatch time
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Route the request through a proxy
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    /// Values for `:name` placeholders, in left-to-right order
    ///
    /// Replaces any values passed earlier.
    pub fn path_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Set a query parameter
    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Set multiple query parameters
    pub fn query_params(mut self, params: HashMap<String, String>) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Percent-decode the encoded query string before sending it
    ///
    /// The query is encoded first and then decoded, so reserved characters in
    /// values (`&`, `=`) end up raw on the wire.
    pub fn unescape_query_params(mut self, unescape: bool) -> Self {
        self.unescape_query_params = unescape;
        self
    }

    /// Set a header; sent after Authorization and Content-Type
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set multiple headers
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Send raw bytes as the body, ahead of any JSON or form body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = self.body.offer(RequestBody::Raw(body.into()));
        self
    }

    /// Send `value` as JSON unless a raw body is set
    ///
    /// Encoding failures are reported by dispatch.
    pub fn body_json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.body = self.body.offer(RequestBody::json(value));
        self
    }

    /// Send form values unless a raw or JSON body is set
    pub fn body_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = self.body.offer(RequestBody::form(values));
        self
    }

    /// Content type for raw or empty bodies
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Total timeout for a client built at dispatch time; zero means default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Log the outgoing URL and the full response body
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set basic authentication
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Auth::Basic {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    /// Set bearer token authentication
    pub fn bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Auth::Bearer(token.into());
        self
    }

    /// Run every pre-flight stage and build the wire request.
    ///
    /// Order: method, path params, body, URL, auth, content type, user
    /// headers, query. The first failing stage ends the pipeline.
    pub fn prepare(&self) -> HttpResult<reqwest::Request> {
        let method = HttpMethod::validate(&self.method)?;
        let url = path::substitute(&self.url, &self.path_params)?;
        let body = self.body.resolve(self.content_type.as_deref())?;

        let mut url = reqwest::Url::parse(&url)
            .map_err(|e| HttpError::RequestConstructionFailed(format!("{}: {}", url, e)))?;
        // Query last, it may rewrite the raw query already on the URL.
        query::apply(&mut url, &self.query_params, self.unescape_query_params)?;

        let mut request = reqwest::Request::new(method.to_reqwest(), url);
        let headers = request.headers_mut();

        if let Some(value) = self.auth.header_value() {
            headers.append(AUTHORIZATION, header_value(&value)?);
        }
        if let Some(content_type) = body.content_type.as_deref() {
            headers.append(CONTENT_TYPE, header_value(content_type)?);
        }
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpError::RequestConstructionFailed(format!("invalid header name {:?}: {}", name, e))
            })?;
            headers.append(name, header_value(value)?);
        }

        if let Some(bytes) = body.bytes {
            *request.body_mut() = Some(bytes.into());
        }

        debug!(
            method = %method,
            body = self.body.kind(),
            headers = request.headers().len(),
            "prepared request"
        );
        Ok(request)
    }

    /// Send the request and return the response
    ///
    /// The caller owns the response body. With verbose set, the body is
    /// already buffered, but reads the same as an unbuffered one.
    pub async fn dispatch(&self) -> HttpResult<HttpResponse> {
        let request = self.prepare()?;
        let transport = transport::select(
            self.transport.as_ref(),
            self.proxy_url.as_deref(),
            self.timeout,
            &self.config,
        )?;

        if self.verbose {
            info!(
                url = %without_password(request.url()),
                "dispatching request"
            );
        }

        let start = Instant::now();
        let response = transport
            .send(request)
            .await
            .map_err(HttpError::DispatchFailed)?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let mut response = HttpResponse::from_reqwest(response, latency_ms);
        if self.verbose {
            let body = response.buffer().await?;
            info!(
                status = response.status_code,
                latency_ms,
                "dispatch response: [{}][{}][{}]",
                response.status_code,
                response.status_text(),
                String::from_utf8_lossy(&body)
            );
        }

        Ok(response)
    }

    /// Dispatch and decode the JSON response into `target`
    ///
    /// `None` is rejected before anything is sent. The body is consumed.
    /// `target` is overwritten with the decoded value: fields absent from the
    /// JSON take their serde defaults (or fail to decode) rather than keeping
    /// what `target` held before.
    pub async fn dispatch_scan<T: DeserializeOwned>(&self, target: Option<&mut T>) -> HttpResult<()> {
        let target = target.ok_or(HttpError::NilResponseTarget)?;
        *target = self.dispatch_json().await?;
        Ok(())
    }

    /// Dispatch and return the decoded JSON response
    pub async fn dispatch_json<T: DeserializeOwned>(&self) -> HttpResult<T> {
        let response = self.dispatch().await?;
        let status = response.status_code;
        let bytes = response.bytes().await?;
        decode_json(status, &bytes)
    }
}

/// Copy of `url` with the password cleared, for logs.
fn without_password(url: &reqwest::Url) -> reqwest::Url {
    let mut url = url.clone();
    // Fails only for URLs that cannot carry credentials at all.
    let _ = url.set_password(None);
    url
}

fn header_value(value: &str) -> HttpResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        HttpError::RequestConstructionFailed(format!("invalid header value: {}", e))
    })
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field(
                "url",
                &reqwest::Url::parse(&self.url)
                    .map(|u| without_password(&u).to_string())
                    .unwrap_or_else(|_| self.url.clone()),
            )
            .field("path_params", &self.path_params)
            .field("query_params", &self.query_params.len())
            .field("headers", &self.headers.len())
            .field("body", &self.body.kind())
            .field("timeout", &self.timeout)
            .field("custom_transport", &self.transport.is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}
