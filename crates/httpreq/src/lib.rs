//! httpreq: fluent request builder for HTTP calls
//!
//! A `RequestBuilder` collects method, URL template, path parameters,
//! headers, query parameters, body, auth, timeout and proxy settings through
//! chained setters. Nothing is checked until dispatch, which runs a fixed
//! pipeline and stops at the first failing stage:
//!
//! 1. method and path-parameter validation (no I/O yet)
//! 2. body resolution: raw bytes, then JSON, then form values
//! 3. request construction: auth, content type, user headers, query string
//! 4. transport selection: caller's transport, or a client built from `ClientConfig`
//! 5. send, with optional verbose logging of the response body
//!
//! `dispatch_scan` / `dispatch_json` additionally decode the body as JSON.

pub mod auth;
pub mod body;
pub mod config;
pub mod error;
pub mod method;
pub mod path;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use auth::Auth;
pub use body::{RequestBody, CONTENT_TYPE_JSON, CONTENT_TYPE_URLENCODED};
pub use config::{ClientConfig, DEFAULT_TIMEOUT};
pub use error::{BoxError, HttpError, HttpErrorCategory, HttpResult};
pub use method::HttpMethod;
pub use request::RequestBuilder;
pub use response::HttpResponse;
pub use transport::Transport;
