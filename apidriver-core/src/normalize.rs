//! Error/body disambiguation.
//!
//! Status codes alone do not say whether an exchange failed: a `200` can
//! carry `{"error": ...}`, and some endpoints answer with free text. The
//! rules below decide, in this order:
//!
//! 1. a transport error carrying a response payload: the payload is the error;
//! 2. any other transport error: its message, parsed as JSON when possible;
//! 3. no transport error: a textual body is parsed; unparsable text yields
//!    neither error nor body; an object with a truthy `error` field is the
//!    error; anything else is the body.

use serde_json::Value;

use crate::NormalizedResult;

/// Failure reported by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    /// Human readable message.
    pub message: String,
    /// Decoded body of the failing response, when one was received.
    pub payload: Option<Value>,
}

impl TransportError {
    /// An error with no response attached (connection refused, timeout).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: None,
        }
    }

    /// An error raised for a received response.
    pub fn with_payload(message: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            message: message.into(),
            payload,
        }
    }
}

/// JavaScript-style truthiness, used for `error` fields and payloads.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn parse_or_keep(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Decide `{error, body}` and attach the status.
pub fn process_response(
    error: Option<&TransportError>,
    status: Option<u16>,
    body: Option<Value>,
) -> NormalizedResult {
    if let Some(error) = error {
        if let Some(payload) = error.payload.as_ref().filter(|p| is_truthy(p)) {
            return NormalizedResult::failure(payload.clone(), status);
        }
        return NormalizedResult::failure(parse_or_keep(&error.message), status);
    }

    let body = match body {
        Some(Value::String(text)) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => Some(parsed),
            Err(_) => return NormalizedResult::success(None, status),
        },
        other => other,
    };
    process_parsed(status, body)
}

/// Rule 3 for a body that is already structured: strings are kept as they
/// are, only the `error` field check applies.
pub fn process_parsed(status: Option<u16>, body: Option<Value>) -> NormalizedResult {
    let is_error = matches!(
        &body,
        Some(Value::Object(object)) if object.get("error").is_some_and(is_truthy)
    );
    match body {
        Some(body) if is_error => NormalizedResult::failure(body, status),
        body => NormalizedResult::success(body, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parsed_string_is_not_reparsed() {
        let result = process_parsed(Some(200), Some(json!("PLAIN TEXT")));
        assert_eq!(result.body(), Some(&json!("PLAIN TEXT")));
        assert_eq!(result.error(), None);

        let result = process_parsed(Some(200), Some(json!({"error": "quota"})));
        assert_eq!(result.error(), Some(&json!({"error": "quota"})));
        assert_eq!(result.body(), None);
    }

    #[test]
    fn test_json_body_is_success() {
        let result = process_response(None, Some(200), Some(json!({"name": "a"})));
        assert_eq!(result.error(), None);
        assert_eq!(result.body(), Some(&json!({"name": "a"})));
        assert_eq!(result.status_code(), Some(200));
    }

    #[test]
    fn test_payload_is_the_error() {
        let err = TransportError::with_payload(
            "Request failed with status code 404",
            Some(json!({"error": "not found"})),
        );
        let result = process_response(Some(&err), Some(404), None);
        assert_eq!(result.error(), Some(&json!({"error": "not found"})));
        assert_eq!(result.body(), None);
        assert_eq!(result.status_code(), Some(404));
    }

    #[test]
    fn test_payload_wins_over_body() {
        let err = TransportError::with_payload("boom", Some(json!({"code": 7})));
        let result = process_response(Some(&err), Some(500), Some(json!({"ignored": true})));
        assert_eq!(result.error(), Some(&json!({"code": 7})));
        assert_eq!(result.body(), None);
    }

    #[test]
    fn test_empty_payload_falls_back_to_message() {
        let err = TransportError::with_payload(
            "Request failed with status code 503",
            Some(json!("")),
        );
        let result = process_response(Some(&err), Some(503), None);
        assert_eq!(
            result.error(),
            Some(&json!("Request failed with status code 503"))
        );
    }

    #[test]
    fn test_textual_error_parsed_when_possible() {
        let err = TransportError::new(r#"{"reason": "offline"}"#);
        let result = process_response(Some(&err), None, None);
        assert_eq!(result.error(), Some(&json!({"reason": "offline"})));
        assert_eq!(result.status_code(), None);

        let err = TransportError::new("connection refused");
        let result = process_response(Some(&err), None, None);
        assert_eq!(result.error(), Some(&json!("connection refused")));
    }

    #[test]
    fn test_unparsable_text_is_swallowed() {
        let result = process_response(None, Some(200), Some(json!("plain text")));
        assert_eq!(result, NormalizedResult::success(None, Some(200)));
    }

    #[test]
    fn test_textual_json_body_is_parsed() {
        let result = process_response(None, Some(200), Some(json!(r#"{"id": 3}"#)));
        assert_eq!(result.body(), Some(&json!({"id": 3})));

        let result = process_response(None, Some(200), Some(json!(r#"{"error": "nope"}"#)));
        assert_eq!(result.error(), Some(&json!({"error": "nope"})));
        assert_eq!(result.body(), None);
    }

    #[test]
    fn test_error_field_in_success_response() {
        let result = process_response(None, Some(200), Some(json!({"error": {"code": 1}})));
        assert_eq!(result.error(), Some(&json!({"error": {"code": 1}})));
        assert_eq!(result.body(), None);
        assert_eq!(result.status_code(), Some(200));
    }

    #[test]
    fn test_falsy_error_field_is_not_an_error() {
        for falsy in [json!(null), json!(false), json!(0), json!("")] {
            let body = json!({"error": falsy, "data": 1});
            let result = process_response(None, Some(200), Some(body.clone()));
            assert_eq!(result.body(), Some(&body));
            assert!(!result.is_error());
        }
    }

    #[test]
    fn test_non_object_bodies() {
        let result = process_response(None, Some(201), Some(json!([1, 2])));
        assert_eq!(result.body(), Some(&json!([1, 2])));

        let result = process_response(None, Some(202), None);
        assert_eq!(result, NormalizedResult::success(None, Some(202)));
    }

    #[test]
    fn test_error_and_body_exclusive() {
        let cases = [
            (None, Some(json!({"error": "x"}))),
            (None, Some(json!({"ok": true}))),
            (None, Some(json!("text"))),
            (Some(TransportError::new("down")), Some(json!({"ok": true}))),
            (
                Some(TransportError::with_payload("bad", Some(json!({"e": 1})))),
                None,
            ),
        ];

        for (error, body) in cases {
            let result = process_response(error.as_ref(), Some(200), body);
            assert!(!(result.error().is_some() && result.body().is_some()));
        }
    }
}
