//! Query string encoding

use crate::error::{HttpError, HttpResult};
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Merge `params` into the query already present on `url` and install the result.
///
/// Pairs are encoded sorted by key. With `unescape` set, the encoded string is
/// percent-decoded again before it becomes the raw query, which can reintroduce
/// `&` or `=` inside values.
pub fn apply(url: &mut Url, params: &HashMap<String, String>, unescape: bool) -> HttpResult<()> {
    if params.is_empty() {
        return Ok(());
    }

    let mut merged: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (k, v) in url.query_pairs() {
        merged.entry(k.into_owned()).or_default().push(v.into_owned());
    }
    for (k, v) in params {
        merged.entry(k.clone()).or_default().push(v.clone());
    }

    let mut encoded = encode(&merged);
    if unescape {
        encoded = unescape_query(&encoded)?;
    }

    tracing::debug!(query = %encoded, unescape, "applied query params");
    url.set_query(Some(&encoded));
    Ok(())
}

// form_urlencoded keeps `*` raw and escapes `~` (as %7E); same meaning on the wire.
fn encode(pairs: &BTreeMap<String, Vec<String>>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, values) in pairs {
        for v in values {
            serializer.append_pair(k, v);
        }
    }
    serializer.finish()
}

/// Decode a form-encoded query string: `+` becomes a space and `%XX` escapes
/// are resolved. A truncated or non-hex escape is an error, as is a result
/// that is not UTF-8.
pub fn unescape_query(encoded: &str) -> HttpResult<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                let end = (i + 3).min(bytes.len());
                return Err(HttpError::QueryUnescapeFailed(format!(
                    "invalid URL escape {:?}",
                    String::from_utf8_lossy(&bytes[i..end])
                )));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let spaced = encoded.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| HttpError::QueryUnescapeFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_params_leave_url_alone() {
        let mut url = Url::parse("http://foo.com/users?b=2&a=1").unwrap();
        apply(&mut url, &HashMap::new(), true).unwrap();
        assert_eq!(url.query(), Some("b=2&a=1"));
    }

    #[test]
    fn test_sorted_and_merged_with_existing() {
        let mut url = Url::parse("http://foo.com/users?wrb=true").unwrap();
        apply(&mut url, &params(&[("page", "2"), ("name", "a b")]), false).unwrap();
        assert_eq!(url.query(), Some("name=a+b&page=2&wrb=true"));
    }

    #[test]
    fn test_star_raw_tilde_escaped() {
        let mut url = Url::parse("http://foo.com/").unwrap();
        apply(&mut url, &params(&[("k", "a*b~c")]), false).unwrap();
        assert_eq!(url.query(), Some("k=a*b%7Ec"));
    }

    #[test]
    fn test_existing_key_keeps_both_values() {
        let mut url = Url::parse("http://foo.com/?tag=x").unwrap();
        apply(&mut url, &params(&[("tag", "y")]), false).unwrap();
        assert_eq!(url.query(), Some("tag=x&tag=y"));
    }

    #[test]
    fn test_unescape_reintroduces_reserved_characters() {
        let mut url = Url::parse("http://foo.com/").unwrap();
        apply(&mut url, &params(&[("filter", "a=b&c"), ("path", "x/y")]), true).unwrap();
        assert_eq!(url.query(), Some("filter=a=b&c&path=x/y"));
    }

    #[test]
    fn test_unescape_query() {
        assert_eq!(unescape_query("a=b+c%2Fd").unwrap(), "a=b c/d");
        assert_eq!(unescape_query("plus=%2B").unwrap(), "plus=+");
    }

    #[test]
    fn test_unescape_rejects_malformed_escape() {
        assert!(matches!(
            unescape_query("a=%zz"),
            Err(HttpError::QueryUnescapeFailed(_))
        ));
        assert!(matches!(
            unescape_query("a=%2"),
            Err(HttpError::QueryUnescapeFailed(_))
        ));
    }

    #[test]
    fn test_unescape_rejects_invalid_utf8() {
        assert!(matches!(
            unescape_query("a=%FF"),
            Err(HttpError::QueryUnescapeFailed(_))
        ));
    }
}
