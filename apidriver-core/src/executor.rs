//! Request execution: send, follow 302s, transform, normalize.

use apidriver_http_client::{HttpClient, RequestBuilder, Response, Url};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::data::param_pairs;
use crate::driver::{SessionState, TransformFn};
use crate::normalize::{TransportError, process_parsed, process_response};
use crate::{CallData, NormalizedResult, RequestPlan, Result, RouteError};

/// Statuses this layer does not treat as failures.
const NON_ERROR_STATUSES: [u16; 4] = [200, 201, 202, 302];

/// How the body of a plan is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyEncoding {
    /// Strings as text, everything else as JSON.
    Auto,
    /// Always JSON.
    Json,
}

/// A successful response body after the transform step.
enum Body {
    /// Text the transform rejected; parsed again during normalization.
    Raw(String),
    /// Transform output, taken as is.
    Transformed(Value),
}

/// Everything a call needs at send time, shared by all endpoints.
pub(crate) struct DriverContext {
    pub(crate) http: HttpClient,
    pub(crate) session: RwLock<SessionState>,
    pub(crate) transform: TransformFn,
    pub(crate) verbose: bool,
    pub(crate) multi_args: bool,
}

impl DriverContext {
    /// Resolve `uri` against the current base URL. An empty base counts as none.
    pub(crate) fn resolve_url(&self, route: &str, uri: &str) -> Result<Url> {
        let base = self.session.read().base_url.clone();
        let resolved = match base.as_deref().filter(|b| !b.is_empty()) {
            Some(base) => Url::parse(base).and_then(|base| base.join(uri)),
            None => Url::parse(uri),
        };
        resolved.map_err(|e| RouteError::InvalidUrl {
            route: route.to_string(),
            message: e.to_string(),
        })
    }

    /// Execute a plan until a non-redirect outcome, then normalize it.
    ///
    /// Each `302` with a `Location` header rewrites the shared base URL and
    /// resends the same plan at the new path. There is no hop limit.
    pub(crate) async fn send(
        &self,
        route: &str,
        mut plan: RequestPlan,
        encoding: BodyEncoding,
    ) -> Result<NormalizedResult> {
        if plan.uri.is_empty() {
            return Err(RouteError::MissingUri(route.to_string()));
        }

        loop {
            let url = self.resolve_url(route, &plan.uri)?;
            let token = self.session.read().token.clone();
            let request = self.build_request(&plan, url, token.as_deref(), encoding);

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    debug!(route, error = %e, "Transport failure");
                    let error = TransportError::new(e.to_string());
                    return Ok(process_response(Some(&error), e.status_code(), None));
                }
            };

            let status = response.status().as_u16();
            if !NON_ERROR_STATUSES.contains(&status) {
                let error = TransportError::with_payload(
                    format!("Request failed with status code {status}"),
                    decode_payload(&response),
                );
                return Ok(process_response(Some(&error), Some(status), None));
            }

            if status == 302
                && let Some(location) = response.location()
            {
                let (base_url, path) = split_location(response.url(), location).map_err(|e| {
                    RouteError::InvalidUrl {
                        route: route.to_string(),
                        message: e.to_string(),
                    }
                })?;
                info!(route, base_url = %base_url, path = %path, "Following redirect");
                self.session.write().base_url = Some(base_url);
                plan.uri = path;
                continue;
            }

            return Ok(match self.transform_body(route, &response) {
                Some(Body::Raw(text)) => {
                    process_response(None, Some(status), Some(Value::String(text)))
                }
                Some(Body::Transformed(value)) => process_parsed(Some(status), Some(value)),
                None => process_parsed(Some(status), None),
            });
        }
    }

    fn build_request<'a>(
        &'a self,
        plan: &RequestPlan,
        url: Url,
        token: Option<&str>,
        encoding: BodyEncoding,
    ) -> RequestBuilder<'a> {
        let mut request = self.http.request(plan.method.clone(), url.to_string());

        if let Some(form) = &plan.form_data {
            request = request.form(&param_pairs(form));
        }
        if let Some(auth) = &plan.auth {
            request = request.basic_auth(auth.username.clone(), auth.password.clone());
        }
        if let Some(body) = &plan.body {
            request = match (body, encoding) {
                (Value::String(text), BodyEncoding::Auto) => request.text(text.clone()),
                (body, _) => request.json(body),
            };
        }
        if let Some(qs) = &plan.qs {
            request = request.queries(param_pairs(qs));
        }
        request = request.headers(plan.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Apply the body transform to textual bodies; keep the text if it fails.
    fn transform_body(&self, route: &str, response: &Response) -> Option<Body> {
        let bytes = response.bytes();
        if bytes.is_empty() {
            return None;
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => match (self.transform)(text) {
                Ok(value) => Some(Body::Transformed(value)),
                Err(e) => {
                    warn!(route, error = %e, "Response body transform failed, keeping raw text");
                    Some(Body::Raw(text.to_string()))
                }
            },
            Err(_) => Some(Body::Transformed(Value::Array(
                bytes.iter().map(|b| Value::from(*b)).collect(),
            ))),
        }
    }

    /// Verbose-mode trace of a finished generated call.
    pub(crate) fn log_verbose(&self, route: &str, data: &CallData, result: &NormalizedResult) {
        if !self.verbose {
            return;
        }
        let send_params = serde_json::to_string(data).unwrap_or_default();
        info!(route, send_params = %send_params, "{} successfully done.", route);
        info!(route, status = ?result.status_code(), "response code");
        if let Ok(pretty) = serde_json::to_string_pretty(result) {
            info!(route, "{}", pretty);
        }
    }
}

/// Body of a failing response, decoded the way a JSON-expecting client
/// would: JSON when it parses, text otherwise, nothing when empty.
fn decode_payload(response: &Response) -> Option<Value> {
    let text = response.text().ok()?;
    if text.is_empty() {
        return None;
    }
    Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

/// Split a redirect target into `(scheme://host[:port], path[?query])`.
fn split_location(current: &Url, location: &str) -> std::result::Result<(String, String), url::ParseError> {
    let target = current.join(location)?;
    let base_url = target.origin().ascii_serialization();
    let path = match target.query() {
        Some(query) => format!("{}?{}", target.path(), query),
        None => target.path().to_string(),
    };
    Ok((base_url, path))
}
