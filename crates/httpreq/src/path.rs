//! Path parameter validation and substitution
//!
//! Placeholders are `/`-delimited segments starting with `:`, e.g.
//! `http://foo.com/api/teams/:team/users/:user`. Values are bound purely by
//! position, left to right.

use crate::error::{HttpError, HttpResult};
use std::borrow::Cow;

const PLACEHOLDER_PREFIX: char = ':';
const SEPARATOR: char = '/';
const PLACEHOLDER_MARKER: &str = "/:";

/// Number of placeholders announced by the template.
pub fn placeholder_count(url: &str) -> usize {
    url.matches(PLACEHOLDER_MARKER).count()
}

/// Resolve every placeholder in `url` against `values`.
///
/// Templates without a `/:` marker are returned untouched whatever `values`
/// holds. The template itself is never modified.
pub fn substitute<'a, S: AsRef<str>>(url: &'a str, values: &[S]) -> HttpResult<Cow<'a, str>> {
    if !url.contains(PLACEHOLDER_MARKER) {
        return Ok(Cow::Borrowed(url));
    }

    let supplied = values.len();
    if supplied == 0 {
        return Err(HttpError::NoPathParamValue);
    }

    let placeholders = placeholder_count(url);
    if placeholders != supplied {
        return Err(HttpError::PathParamCountMismatch {
            placeholders,
            supplied,
        });
    }

    let mut consumed = 0;
    let mut segments = Vec::new();
    for segment in url.split(SEPARATOR) {
        if segment.starts_with(PLACEHOLDER_PREFIX) {
            // A leading `:segment` carries no `/` marker, so it can outrun the count check.
            let value = values
                .get(consumed)
                .ok_or(HttpError::PathParamConflict {
                    consumed: consumed + 1,
                    supplied,
                })?;
            segments.push(value.as_ref());
            consumed += 1;
        } else {
            segments.push(segment);
        }
    }

    if consumed != supplied {
        return Err(HttpError::PathParamConflict { consumed, supplied });
    }

    let resolved = segments.join("/");
    tracing::debug!(placeholders, "substituted path params");
    Ok(Cow::Owned(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn test_no_placeholder_is_noop() {
        let url = "http://foo.com/api/users?name=bar";
        assert_eq!(substitute(url, &NONE).unwrap(), url);
        assert_eq!(substitute(url, &["ignored", "too"]).unwrap(), url);
        assert!(matches!(substitute(url, &["x"]).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_single_placeholder() {
        assert_eq!(substitute("/:user", &["bar"]).unwrap(), "/bar");
    }

    #[test]
    fn test_left_to_right_order() {
        let url = "http://foo.com/:team/users/:user";
        assert_eq!(
            substitute(url, &["bar", "ghazni"]).unwrap(),
            "http://foo.com/bar/users/ghazni"
        );
    }

    #[test]
    fn test_zero_values() {
        assert!(matches!(
            substitute("/:team/users/:user", &NONE),
            Err(HttpError::NoPathParamValue)
        ));
    }

    #[test]
    fn test_count_mismatch_both_directions() {
        let url = "/:team/users/:user";
        assert!(matches!(
            substitute(url, &["bar"]),
            Err(HttpError::PathParamCountMismatch { placeholders: 2, supplied: 1 })
        ));
        assert!(matches!(
            substitute(url, &["a", "b", "c"]),
            Err(HttpError::PathParamCountMismatch { placeholders: 2, supplied: 3 })
        ));
    }

    #[test]
    fn test_leading_placeholder_without_marker_conflicts() {
        // Only one `/:` marker but two `:` segments.
        assert!(matches!(
            substitute(":team/:user", &["bar"]),
            Err(HttpError::PathParamConflict { consumed: 2, supplied: 1 })
        ));
    }

    #[test]
    fn test_template_reusable() {
        let url = String::from("/users/:id");
        let first = substitute(&url, &["1"]).unwrap().into_owned();
        let second = substitute(&url, &["2"]).unwrap().into_owned();
        assert_eq!(first, "/users/1");
        assert_eq!(second, "/users/2");
        assert_eq!(url, "/users/:id");
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(placeholder_count("/a/b"), 0);
        assert_eq!(placeholder_count("/:a/b/:c"), 2);
    }
}
