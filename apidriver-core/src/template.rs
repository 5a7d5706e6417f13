//! URI placeholder substitution.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;
use std::fmt::Debug;

use crate::CallData;
use crate::data::param_string;

/// Characters escaped when a value is substituted into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Strategy that turns a URI template plus call data into a concrete URI.
pub trait UriTemplate: Send + Sync + Debug {
    /// Substitute placeholders.
    ///
    /// On failure returns the name of the placeholder that had no value.
    fn render(&self, template: &str, data: &CallData) -> Result<String, String>;
}

/// `{name}` placeholders filled from top-level call data fields.
///
/// Strings are inserted verbatim, numbers and booleans as their JSON text,
/// all percent-encoded as a path segment. Text with an unmatched `{` is
/// copied through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceTemplate;

impl UriTemplate for BraceTemplate {
    fn render(&self, template: &str, data: &CallData) -> Result<String, String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + close];

            out.push_str(&rest[..open]);
            match data.get(name) {
                Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                    let raw = param_string(value);
                    out.extend(utf8_percent_encode(&raw, PATH_SEGMENT));
                }
                _ => return Err(name.to_string()),
            }
            rest = &rest[open + close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

/// Leaves the template as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbatimTemplate;

impl UriTemplate for VerbatimTemplate {
    fn render(&self, template: &str, _data: &CallData) -> Result<String, String> {
        Ok(template.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(template: &str, data: Value) -> Result<String, String> {
        BraceTemplate.render(template, &CallData::from(data))
    }

    #[test]
    fn test_substitutes_placeholders() {
        assert_eq!(
            render("/users/{id}/posts/{slug}", json!({"id": 5, "slug": "hello"})).unwrap(),
            "/users/5/posts/hello"
        );
        assert_eq!(render("/flags/{on}", json!({"on": true})).unwrap(), "/flags/true");
    }

    #[test]
    fn test_encodes_path_segment() {
        assert_eq!(
            render("/files/{name}", json!({"name": "a b/c?d"})).unwrap(),
            "/files/a%20b%2Fc%3Fd"
        );
    }

    #[test]
    fn test_missing_placeholder_is_reported() {
        assert_eq!(render("/users/{id}", json!({})).unwrap_err(), "id");
        assert_eq!(render("/users/{id}", json!({"id": null})).unwrap_err(), "id");
        assert_eq!(render("/users/{id}", json!({"id": {"x": 1}})).unwrap_err(), "id");
    }

    #[test]
    fn test_plain_and_unterminated_templates() {
        assert_eq!(render("/health", json!({})).unwrap(), "/health");
        assert_eq!(render("/odd/{open", json!({})).unwrap(), "/odd/{open");
    }

    #[test]
    fn test_verbatim_template() {
        let data = CallData::from(json!({"id": 1}));
        assert_eq!(VerbatimTemplate.render("/users/{id}", &data).unwrap(), "/users/{id}");
    }
}
