//! Request builder.

use crate::{HttpClient, HttpClientError, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;

/// HTTP request builder.
///
/// Headers are stored in a [`HeaderMap`], so setting a header that already
/// exists (compared case-insensitively) replaces the earlier value.
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl<'a> RequestBuilder<'a> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "Skipping invalid header");
            }
        }
        self
    }

    /// Add multiple headers to the request.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.push((k.into(), v.into()));
        }
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Some(text.into_bytes());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Some(bytes);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON body");
            }
        }
        self
    }

    /// Set the request body as form data.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                self.body = Some(encoded.into_bytes());
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode form data");
            }
        }
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Set basic authentication.
    pub fn basic_auth(
        self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        use base64::Engine;
        let credentials = match password {
            Some(p) => format!("{}:{}", username.into(), p.into()),
            None => format!("{}:", username.into()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Peek at the headers assembled so far.
    pub fn header_map(&self) -> &HeaderMap {
        &self.headers
    }

    /// Build the URL with query parameters.
    fn build_url(&self) -> Result<url::Url> {
        let mut url =
            url::Url::parse(&self.url).map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;

        if !self.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response> {
        let url = self.build_url()?;

        // Request headers replace defaults with the same name
        let mut headers = self.client.config().default_header_map();
        headers.extend(self.headers);

        let mut request = self
            .client
            .inner()
            .request(self.method.clone(), url)
            .headers(headers);

        if let Some(body) = self.body {
            request = request.body(body);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let request = request
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;
        self.client.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpClientConfig;
    use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::default_client().unwrap()
    }

    #[test]
    fn test_later_header_replaces_earlier() {
        let client = client();
        let builder = client
            .get("http://localhost/")
            .header("authorization", "Basic abc")
            .bearer_auth("t0k3n");

        assert_eq!(builder.header_map().len(), 1);
        assert_eq!(
            builder.header_map().get("Authorization").unwrap(),
            "Bearer t0k3n"
        );
    }

    #[test]
    fn test_basic_auth_encoding() {
        let client = client();
        let builder = client
            .get("http://localhost/")
            .basic_auth("user", Some("pass"));

        // base64("user:pass")
        assert_eq!(
            builder.header_map().get("Authorization").unwrap(),
            "Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn test_form_sets_content_type() {
        let client = client();
        let builder = client
            .post("http://localhost/")
            .form(&vec![("a", "1"), ("b", "two")]);

        assert_eq!(
            builder.header_map().get("Content-Type").unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[tokio::test]
    async fn test_relative_url_is_rejected() {
        let client = client();
        let err = client.get("/users").send().await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_send_json_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(query_param("dry", "true"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"item": "widget"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let response = client()
            .post(format!("{}/orders", server.uri()))
            .query("dry", "true")
            .json(&serde_json::json!({"item": "widget"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201);
    }

    #[tokio::test]
    async fn test_request_headers_replace_defaults() {
        let server = MockServer::start().await;
        Mock::given(path("/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(
            HttpClientConfig::builder()
                .default_header("Authorization", "Basic old")
                .default_header("X-Env", "default")
                .default_header("X-Kept", "yes")
                .build(),
        )
        .unwrap();

        client
            .get(format!("{}/me", server.uri()))
            .header("X-Env", "caller")
            .bearer_auth("secret")
            .send()
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        let values = |name: &str| -> Vec<String> {
            headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(values("authorization"), vec!["Bearer secret"]);
        assert_eq!(values("x-env"), vec!["caller"]);
        assert_eq!(values("x-kept"), vec!["yes"]);
    }

    #[tokio::test]
    async fn test_send_text_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/notes/1"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let response = client()
            .put(format!("{}/notes/1", server.uri()))
            .text("hello")
            .send()
            .await
            .unwrap();

        assert!(response.is_success());
    }
}
