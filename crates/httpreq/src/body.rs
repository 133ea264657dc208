//! Request body sources and resolution

use crate::error::{HttpError, HttpResult};
use bytes::Bytes;
use serde::Serialize;

/// `application/json`
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// `application/x-www-form-urlencoded`
pub const CONTENT_TYPE_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The single body source a request carries.
///
/// Offering a new source only replaces the current one when it ranks at least
/// as high: raw bytes beat a JSON document, which beats form values.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Caller-provided bytes, sent as-is
    Raw(Bytes),
    /// Encoded JSON document, or the encoder's failure kept until dispatch
    Json(Result<Bytes, String>),
    /// Form values (application/x-www-form-urlencoded)
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Encode `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        RequestBody::Json(
            serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| e.to_string()),
        )
    }

    /// Build a form body from key/value pairs.
    pub fn form<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn rank(&self) -> u8 {
        match self {
            RequestBody::None => 0,
            RequestBody::Form(_) => 1,
            RequestBody::Json(_) => 2,
            RequestBody::Raw(_) => 3,
        }
    }

    /// Keep whichever of `self` and `candidate` takes precedence.
    pub(crate) fn offer(self, candidate: RequestBody) -> RequestBody {
        if candidate.rank() >= self.rank() {
            candidate
        } else {
            self
        }
    }

    /// Short name of the active source, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::None => "none",
            RequestBody::Raw(_) => "raw",
            RequestBody::Json(_) => "json",
            RequestBody::Form(_) => "form",
        }
    }

    /// Turn the active source into wire bytes and a content type.
    ///
    /// `caller_content_type` survives only for raw and absent bodies.
    pub fn resolve(&self, caller_content_type: Option<&str>) -> HttpResult<ResolvedBody> {
        let caller = caller_content_type.map(str::to_string);
        let resolved = match self {
            RequestBody::None => ResolvedBody {
                bytes: None,
                content_type: caller,
            },
            RequestBody::Raw(bytes) => ResolvedBody {
                bytes: Some(bytes.clone()),
                content_type: caller,
            },
            RequestBody::Json(Ok(bytes)) => ResolvedBody {
                bytes: Some(bytes.clone()),
                content_type: Some(CONTENT_TYPE_JSON.to_string()),
            },
            RequestBody::Json(Err(e)) => return Err(HttpError::SerializationFailed(e.clone())),
            RequestBody::Form(values) => ResolvedBody {
                bytes: Some(Bytes::from(encode_form(values))),
                content_type: Some(CONTENT_TYPE_URLENCODED.to_string()),
            },
        };
        Ok(resolved)
    }
}

/// Body bytes and content type ready for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBody {
    pub bytes: Option<Bytes>,
    pub content_type: Option<String>,
}

/// Encode form pairs sorted by key; repeated keys keep their relative order.
pub fn encode_form(values: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = values.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in sorted {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}
