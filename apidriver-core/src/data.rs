//! Per-call data supplied by the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BasicAuth;

/// Data passed to one endpoint invocation.
///
/// A JSON object. Top-level fields feed URI placeholders (`{id}` reads `id`).
/// A few keys are reserved and feed the request plan instead:
///
/// | key        | meaning                                    |
/// |------------|--------------------------------------------|
/// | `uri`      | URI, used when the route has none          |
/// | `method`   | method, used when the route has none       |
/// | `body`     | request body, used when the route has none |
/// | `qs`       | query parameters object                    |
/// | `formData` | url-encoded form fields object             |
/// | `headers`  | headers object, wins over route headers    |
/// | `auth`     | `{username, password}` basic credentials   |
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallData(Map<String, Value>);

impl CallData {
    /// Empty call data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level field (a URI placeholder value, usually).
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set the URI used when the route does not define one.
    pub fn uri(self, uri: impl Into<String>) -> Self {
        self.param("uri", uri.into())
    }

    /// Set the method used when the route does not define one.
    pub fn method(self, method: impl Into<String>) -> Self {
        self.param("method", method.into())
    }

    /// Set the request body.
    pub fn body(self, body: impl Into<Value>) -> Self {
        self.param("body", body)
    }

    /// Add a query parameter.
    pub fn query(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.nested("qs", key.into(), value.into())
    }

    /// Add a form field.
    pub fn form_field(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.nested("formData", key.into(), value.into())
    }

    /// Add a header.
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.nested("headers", name.into(), Value::String(value.into()))
    }

    /// Set basic auth credentials.
    pub fn basic_auth(self, username: impl Into<String>, password: Option<String>) -> Self {
        let auth = BasicAuth::new(username, password);
        match serde_json::to_value(auth) {
            Ok(value) => self.param("auth", value),
            Err(_) => self,
        }
    }

    fn nested(mut self, field: &str, key: String, value: Value) -> Self {
        let entry = self
            .0
            .entry(field.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key, value);
        }
        self
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A field that counts as supplied: present and not `null`.
    pub(crate) fn present(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn str_field(&self, key: &str) -> Option<&str> {
        self.present(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub(crate) fn object_field(&self, key: &str) -> Option<&Map<String, Value>> {
        self.present(key).and_then(Value::as_object)
    }

    pub(crate) fn headers(&self) -> impl Iterator<Item = (&str, String)> {
        self.object_field("headers")
            .into_iter()
            .flatten()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), param_string(v)))
    }

    pub(crate) fn auth(&self) -> Option<BasicAuth> {
        self.present("auth")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

impl From<Map<String, Value>> for CallData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Objects convert field by field. Any other JSON value yields empty call
/// data, the same as passing nothing.
impl From<Value> for CallData {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::default(),
            other => {
                tracing::warn!(value = %other, "Ignoring non-object call data");
                Self::default()
            }
        }
    }
}

impl From<Option<CallData>> for CallData {
    fn from(data: Option<CallData>) -> Self {
        data.unwrap_or_default()
    }
}

/// Render a JSON scalar the way it appears in a URL or header.
pub(crate) fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Expand a parameter object into key/value pairs; arrays repeat the key.
pub(crate) fn param_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                pairs.extend(items.iter().map(|item| (key.clone(), param_string(item))));
            }
            Value::Null => {}
            other => pairs.push((key.clone(), param_string(other))),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_methods() {
        let data = CallData::new()
            .param("id", 5)
            .query("page", 2)
            .query("tags", json!(["a", "b"]))
            .header("X-Request-Id", "abc")
            .form_field("name", "n")
            .basic_auth("user", None);

        assert_eq!(data.get("id"), Some(&json!(5)));
        assert_eq!(data.object_field("qs").unwrap()["page"], 2);
        assert_eq!(data.object_field("formData").unwrap()["name"], "n");
        assert_eq!(
            data.headers().collect::<Vec<_>>(),
            [("X-Request-Id", "abc".to_string())]
        );
        assert_eq!(data.auth(), Some(BasicAuth::new("user", None)));
    }

    #[test]
    fn test_from_value() {
        let data = CallData::from(json!({"id": 1}));
        assert_eq!(data.get("id"), Some(&json!(1)));

        assert!(CallData::from(Value::Null).is_empty());
        assert!(CallData::from(json!([1, 2])).is_empty());
        assert!(CallData::from(None::<CallData>).is_empty());
    }

    #[test]
    fn test_null_and_empty_fields_are_absent() {
        let data = CallData::from(json!({"body": null, "uri": "", "method": "get"}));
        assert!(data.present("body").is_none());
        assert!(data.str_field("uri").is_none());
        assert_eq!(data.str_field("method"), Some("get"));
    }

    #[test]
    fn test_param_pairs() {
        let map = json!({"q": "rust", "page": 3, "tag": ["x", "y"], "skip": null})
            .as_object()
            .unwrap()
            .clone();

        assert_eq!(
            param_pairs(&map),
            [
                ("q".to_string(), "rust".to_string()),
                ("page".to_string(), "3".to_string()),
                ("tag".to_string(), "x".to_string()),
                ("tag".to_string(), "y".to_string()),
            ]
        );
    }
}
