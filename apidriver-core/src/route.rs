//! Route descriptors and the request plans they render.

use http::Method;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::PATH_SEPARATOR;
use crate::template::{BraceTemplate, UriTemplate};
use crate::{BasicAuth, CallData, Result, RouteConfig, RouteError};

/// Concrete, ready-to-send request for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    /// HTTP method.
    pub method: Method,
    /// URI, relative to the base URL or absolute.
    pub uri: String,
    /// Body; strings are sent as text, everything else as JSON.
    pub body: Option<Value>,
    /// Url-encoded form fields.
    pub form_data: Option<Map<String, Value>>,
    /// Query parameters.
    pub qs: Option<Map<String, Value>>,
    /// Headers, already merged.
    pub headers: BTreeMap<String, String>,
    /// Basic auth credentials.
    pub auth: Option<BasicAuth>,
}

impl RequestPlan {
    /// A bare plan with no body, query, headers or auth.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            form_data: None,
            qs: None,
            headers: BTreeMap::new(),
            auth: None,
        }
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the query parameters.
    pub fn with_query(mut self, qs: Map<String, Value>) -> Self {
        self.qs = Some(qs);
        self
    }

    /// Set a header, replacing any header with the same name in any case.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    /// Look up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn insert_header(headers: &mut BTreeMap<String, String>, name: String, value: String) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Immutable compiled form of one configured route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    full_name: String,
    namespace_sequence: Vec<String>,
    name: String,
    raw_config: RouteConfig,
    template: Arc<dyn UriTemplate>,
}

impl RouteDescriptor {
    /// Build a descriptor using `{name}` placeholder substitution.
    pub fn new(full_name: impl Into<String>, raw_config: RouteConfig) -> Self {
        Self::with_template(full_name, raw_config, Arc::new(BraceTemplate))
    }

    /// Build a descriptor with a specific placeholder strategy.
    pub fn with_template(
        full_name: impl Into<String>,
        raw_config: RouteConfig,
        template: Arc<dyn UriTemplate>,
    ) -> Self {
        let full_name = full_name.into();
        let mut namespace_sequence: Vec<String> = full_name
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect();
        let name = namespace_sequence.pop().unwrap_or_default();

        Self {
            full_name,
            namespace_sequence,
            name,
            raw_config,
            template,
        }
    }

    /// Qualified name, the registry key.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Namespace segments leading to the leaf, outermost first.
    pub fn namespace_sequence(&self) -> &[String] {
        &self.namespace_sequence
    }

    /// Leaf segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The entry as written in the routes document.
    pub fn raw_config(&self) -> &RouteConfig {
        &self.raw_config
    }

    /// Merge the route template with call data into a request plan.
    ///
    /// Route values win for `uri`, `method`, `body`, `qs`, `formData` and
    /// `auth`; call data only fills the gaps. Headers merge the other way
    /// round: call data headers override route headers.
    pub fn render(&self, data: &CallData) -> Result<RequestPlan> {
        let raw = &self.raw_config;

        let uri = non_empty(raw.uri.as_deref())
            .or_else(|| data.str_field("uri"))
            .ok_or_else(|| RouteError::MissingUri(self.full_name.clone()))?;
        let method = non_empty(raw.method.as_deref())
            .or_else(|| data.str_field("method"))
            .ok_or_else(|| RouteError::MissingMethod(self.full_name.clone()))?;

        let method = Method::from_bytes(method.to_uppercase().as_bytes()).map_err(|_| {
            RouteError::InvalidMethod {
                route: self.full_name.clone(),
                method: method.to_string(),
            }
        })?;
        let uri = self
            .template
            .render(uri, data)
            .map_err(|name| RouteError::MissingParameter {
                route: self.full_name.clone(),
                name,
            })?;

        let mut headers = raw.headers.clone();
        for (name, value) in data.headers() {
            insert_header(&mut headers, name.to_string(), value);
        }

        Ok(RequestPlan {
            method,
            uri,
            body: raw
                .body
                .clone()
                .filter(|b| !b.is_null())
                .or_else(|| data.present("body").cloned()),
            form_data: raw
                .form_data
                .clone()
                .or_else(|| data.object_field("formData").cloned()),
            qs: raw.qs.clone().or_else(|| data.object_field("qs").cloned()),
            headers,
            auth: raw.auth.clone().or_else(|| data.auth()),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
