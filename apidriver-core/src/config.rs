//! Route configuration entries and routes document flattening.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::{Result, RouteError};

/// Separator between segments of a qualified route name.
pub const PATH_SEPARATOR: char = '.';

/// Fields whose presence (as a string) marks an object as a route rather than
/// a namespace.
const ROUTE_MARKERS: [&str; 3] = ["method", "uri", "customImplementation"];

/// Credentials for HTTP basic authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// User name.
    pub username: String,
    /// Optional password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl BasicAuth {
    /// Create credentials.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// One route definition as written in the routes document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// HTTP method, case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// URI template, relative to the base URL or absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Static request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Static form fields, sent url-encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_data: Option<Map<String, Value>>,
    /// Static query parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qs: Option<Map<String, Value>>,
    /// Static headers. Call data headers win on conflict.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Static basic auth credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,
    /// Name of an externally supplied handler for this route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_implementation: Option<String>,
}

impl RouteConfig {
    /// Shorthand for a plain `method` + `uri` route.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            uri: Some(uri.into()),
            ..Default::default()
        }
    }

    fn is_route_object(object: &Map<String, Value>) -> bool {
        ROUTE_MARKERS
            .iter()
            .any(|key| object.get(*key).is_some_and(Value::is_string))
    }
}

/// Flatten a routes document into `(qualified name, entry)` pairs.
///
/// Objects carrying a string `method`, `uri` or `customImplementation` are
/// routes; any other object is a namespace whose keys are appended to the
/// qualified name. Keys may contain dots themselves, so the flat form
/// `{"users.get": {...}}` and the nested form `{"users": {"get": {...}}}` name
/// the same route. Document order is preserved.
pub fn route_entries(document: &Value) -> Result<Vec<(String, RouteConfig)>> {
    let root = document.as_object().ok_or_else(|| {
        RouteError::MalformedRoutes("routes document must be an object".to_string())
    })?;

    let mut entries = Vec::new();
    collect(root, None, &mut entries)?;
    Ok(entries)
}

fn collect(
    object: &Map<String, Value>,
    prefix: Option<&str>,
    entries: &mut Vec<(String, RouteConfig)>,
) -> Result<()> {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };

        let Value::Object(child) = value else {
            return Err(RouteError::MalformedRoutes(format!(
                "{name} is neither a route nor a namespace"
            )));
        };

        if RouteConfig::is_route_object(child) {
            let config: RouteConfig = serde_json::from_value(value.clone())
                .map_err(|e| RouteError::MalformedRoutes(format!("{name}: {e}")))?;
            entries.push((name, config));
        } else {
            collect(child, Some(&name), entries)?;
        }
    }
    Ok(())
}
