//! HTTP response types

use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::time::Duration;

enum ResponseBody {
    /// Still on the wire
    Stream(reqwest::Response),
    /// Held in memory; `None` once handed out by `chunk`
    Buffered(Option<Bytes>),
}

/// Dispatched response with built-in latency measurement
///
/// The body stays on the connection until read, unless verbose dispatch
/// already buffered it. Dropping the response releases the body.
pub struct HttpResponse {
    /// HTTP status code
    pub status_code: u16,

    /// Response headers
    pub headers: HeaderMap,

    /// Final URL (may differ from request URL due to redirects)
    pub url: String,

    /// HTTP version
    pub version: String,

    /// Time from send to response headers, in milliseconds
    pub latency_ms: u64,

    body: ResponseBody,
}

impl HttpResponse {
    /// Wrap a live reqwest response
    pub(crate) fn from_reqwest(response: reqwest::Response, latency_ms: u64) -> Self {
        Self {
            status_code: response.status().as_u16(),
            headers: response.headers().clone(),
            url: response.url().to_string(),
            version: format!("{:?}", response.version()),
            latency_ms,
            body: ResponseBody::Stream(response),
        }
    }

    /// Canonical reason phrase, e.g. "200 OK"
    pub fn status_text(&self) -> String {
        let reason = reqwest::StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("");
        format!("{} {}", self.status_code, reason).trim_end().to_string()
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Check if status is client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code)
    }

    /// Check if status is server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    /// Get latency as Duration
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the body already sits in memory
    pub fn is_buffered(&self) -> bool {
        matches!(self.body, ResponseBody::Buffered(_))
    }

    /// Read the whole body into memory, keeping it readable afterwards.
    pub(crate) async fn buffer(&mut self) -> HttpResult<Bytes> {
        let body = std::mem::replace(&mut self.body, ResponseBody::Buffered(None));
        let bytes = match body {
            ResponseBody::Stream(response) => response
                .bytes()
                .await
                .map_err(|e| HttpError::ResponseReadFailed(e.to_string()))?,
            ResponseBody::Buffered(bytes) => bytes.unwrap_or_default(),
        };
        self.body = ResponseBody::Buffered(Some(bytes.clone()));
        Ok(bytes)
    }

    /// Next chunk of the body, `None` at the end
    pub async fn chunk(&mut self) -> HttpResult<Option<Bytes>> {
        match &mut self.body {
            ResponseBody::Stream(response) => response
                .chunk()
                .await
                .map_err(|e| HttpError::ResponseReadFailed(e.to_string())),
            ResponseBody::Buffered(bytes) => Ok(bytes.take().filter(|b| !b.is_empty())),
        }
    }

    /// Consume the response and return the remaining body
    pub async fn bytes(mut self) -> HttpResult<Bytes> {
        self.buffer().await
    }

    /// Get body as text (UTF-8)
    pub async fn text(self) -> HttpResult<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| HttpError::ResponseReadFailed(format!("invalid UTF-8 in response: {}", e)))
    }

    /// Decode the first JSON value of the body
    pub async fn json<T: DeserializeOwned>(self) -> HttpResult<T> {
        let status = self.status_code;
        let bytes = self.bytes().await?;
        decode_json(status, &bytes)
    }
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status_code", &self.status_code)
            .field("url", &self.url)
            .field("version", &self.version)
            .field("latency_ms", &self.latency_ms)
            .field("buffered", &self.is_buffered())
            .finish()
    }
}

/// Trailing bytes after the first value are ignored.
pub(crate) fn decode_json<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> HttpResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde::Deserialize::deserialize(&mut deserializer)
        .map_err(|source| HttpError::DecodeFailed { status, source })
}
