//! Normalized call results.

use serde::Serialize;
use serde_json::Value;

/// Uniform outcome of one call: `{error, body, statusCode}`.
///
/// `error` and `body` are never both set. `status_code` is only present when
/// an HTTP response was actually received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    error: Option<Value>,
    body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
}

impl NormalizedResult {
    /// Successful result.
    pub fn success(body: Option<Value>, status_code: Option<u16>) -> Self {
        Self {
            error: None,
            body,
            status_code,
        }
    }

    /// Failed result; any body is dropped.
    pub fn failure(error: Value, status_code: Option<u16>) -> Self {
        Self {
            error: Some(error),
            body: None,
            status_code,
        }
    }

    /// Error payload, if the call failed.
    pub fn error(&self) -> Option<&Value> {
        self.error.as_ref()
    }

    /// Body, if the call succeeded and produced one.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Status code of the last response received.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Whether an error was reported.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Split into `(error, body, status_code)`, the callback argument order.
    pub fn into_parts(self) -> (Option<Value>, Option<Value>, Option<u16>) {
        (self.error, self.body, self.status_code)
    }
}

/// Result shape selected by the driver's `multi_args` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutput {
    /// The normalized result as a single value.
    Result(NormalizedResult),
    /// The normalized result spread into its parts.
    Parts {
        /// Error payload.
        error: Option<Value>,
        /// Body.
        body: Option<Value>,
        /// Status code.
        status_code: Option<u16>,
    },
}

impl CallOutput {
    pub(crate) fn new(result: NormalizedResult, multi_args: bool) -> Self {
        if multi_args {
            let (error, body, status_code) = result.into_parts();
            Self::Parts {
                error,
                body,
                status_code,
            }
        } else {
            Self::Result(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let ok = NormalizedResult::success(Some(json!({"name": "a"})), Some(200));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"error": null, "body": {"name": "a"}, "statusCode": 200})
        );

        let offline = NormalizedResult::failure(json!("connect ECONNREFUSED"), None);
        assert_eq!(
            serde_json::to_value(&offline).unwrap(),
            json!({"error": "connect ECONNREFUSED", "body": null})
        );
    }

    #[test]
    fn test_call_output_shapes() {
        let result = NormalizedResult::success(Some(json!(1)), Some(201));
        assert_eq!(
            CallOutput::new(result.clone(), false),
            CallOutput::Result(result.clone())
        );
        assert_eq!(
            CallOutput::new(result, true),
            CallOutput::Parts {
                error: None,
                body: Some(json!(1)),
                status_code: Some(201)
            }
        );
    }
}
