//! # apidriver HTTP client
//!
//! The transport underneath apidriver. It owns a pooled `reqwest` client,
//! assembles one request at a time (headers, query, JSON/text/form bodies,
//! basic or bearer auth) and hands back a fully buffered [`Response`].
//!
//! Redirects are never followed here: the route executor in `apidriver-core`
//! inspects `302` responses itself so it can rewrite the driver's base URL.
//! There is no retry layer either; a failed exchange surfaces as an
//! [`HttpClientError`] and the caller decides what to do with it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apidriver_http_client::{HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default())?;
//!
//!     let response = client
//!         .get("https://api.example.com/users")
//!         .bearer_auth("secret")
//!         .send()
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use request::RequestBuilder;
pub use response::Response;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use apidriver_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::request::RequestBuilder;
    pub use crate::response::Response;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
