//! The client facade.

use apidriver_config::{ConfigLoader, ConfigValidator, EnvLoader};
use apidriver_http_client::{HttpClient, HttpClientConfig};
use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::executor::{BodyEncoding, DriverContext};
use crate::namespace::{Endpoint, Namespace, TreeBuilder};
use crate::template::{BraceTemplate, UriTemplate};
use crate::{
    CallData, CustomImplementations, NormalizedResult, RequestPlan, Result, RouteError,
    RouteRegistry,
};

/// Boxed error returned by a body transform.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Turns a textual response body into a JSON value.
pub type TransformFn = Arc<dyn Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Default transform: parse as JSON.
pub fn json_transform() -> TransformFn {
    Arc::new(|body: &str| serde_json::from_str(body).map_err(Into::into))
}

/// Mutable, shared part of the driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Base URL relative URIs are joined against.
    pub base_url: Option<String>,
    /// Bearer token added to every request.
    pub token: Option<String>,
}

/// Where the routes document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutesSource {
    /// JSON or TOML file, format picked by extension.
    Path(PathBuf),
    /// Already parsed document.
    Document(Value),
}

impl From<Value> for RoutesSource {
    fn from(document: Value) -> Self {
        Self::Document(document)
    }
}

impl From<PathBuf> for RoutesSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&str> for RoutesSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

/// Driver configuration.
#[derive(Clone)]
pub struct DriverConfig {
    /// Initial base URL.
    pub base_url: Option<String>,
    /// Initial bearer token.
    pub token: Option<String>,
    /// Log every generated call at info level.
    pub verbose: bool,
    /// Make [`Endpoint::call_output`] return spread parts.
    pub multi_args: bool,
    /// Transform applied to textual response bodies.
    pub transform_response_body: TransformFn,
    /// Handlers for routes with a `customImplementation`.
    pub custom_implementations: CustomImplementations,
    /// The routes document.
    pub routes: Option<RoutesSource>,
    /// Placeholder substitution strategy.
    pub uri_template: Arc<dyn UriTemplate>,
    /// Transport settings.
    pub http: HttpClientConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            verbose: false,
            multi_args: false,
            transform_response_body: json_transform(),
            custom_implementations: CustomImplementations::default(),
            routes: None,
            uri_template: Arc::new(BraceTemplate),
            http: HttpClientConfig::default(),
        }
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("verbose", &self.verbose)
            .field("multi_args", &self.multi_args)
            .field("custom_implementations", &self.custom_implementations)
            .field("routes", &self.routes)
            .field("uri_template", &self.uri_template)
            .field("http", &self.http)
            .finish()
    }
}

impl DriverConfig {
    /// Create a new configuration builder.
    pub fn builder() -> DriverConfigBuilder {
        DriverConfigBuilder::default()
    }
}

/// Builder for driver configuration.
#[derive(Debug, Default)]
pub struct DriverConfigBuilder {
    config: DriverConfig,
}

impl DriverConfigBuilder {
    /// Seed a builder from `APIDRIVER_*` environment variables, reading
    /// `.env` first when one exists.
    pub fn from_env() -> Self {
        let _ = EnvLoader::load_dotenv(None);
        Self::default().env(&EnvLoader::apidriver())
    }

    /// Apply the overrides found by `loader`.
    pub fn env(mut self, loader: &EnvLoader) -> Self {
        let overrides = loader.overrides();
        if let Some(base_url) = overrides.base_url {
            self.config.base_url = Some(base_url);
        }
        if let Some(token) = overrides.token {
            self.config.token = Some(token);
        }
        if let Some(verbose) = overrides.verbose {
            self.config.verbose = verbose;
        }
        if let Some(routes) = overrides.routes {
            self.config.routes = Some(RoutesSource::Path(routes.into()));
        }
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Enable or disable verbose call logging.
    pub fn verbose(mut self, enable: bool) -> Self {
        self.config.verbose = enable;
        self
    }

    /// Select the spread result shape for [`Endpoint::call_output`].
    pub fn multi_args(mut self, enable: bool) -> Self {
        self.config.multi_args = enable;
        self
    }

    /// Replace the textual body transform.
    ///
    /// Its output is the body as is, so a transform may return plain strings.
    /// When it fails the raw text is kept and parsed as JSON during
    /// normalization; text that does not parse yields an empty body.
    pub fn transform_response_body<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.config.transform_response_body = Arc::new(transform);
        self
    }

    /// Set the custom implementation table.
    pub fn custom_implementations(mut self, table: CustomImplementations) -> Self {
        self.config.custom_implementations = table;
        self
    }

    /// Set the routes document (a path or a parsed value).
    pub fn routes(mut self, routes: impl Into<RoutesSource>) -> Self {
        self.config.routes = Some(routes.into());
        self
    }

    /// Replace the placeholder substitution strategy.
    pub fn uri_template(mut self, template: impl UriTemplate + 'static) -> Self {
        self.config.uri_template = Arc::new(template);
        self
    }

    /// Set transport settings.
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DriverConfig {
        self.config
    }
}

/// Client generated from a routes document.
///
/// ```rust,no_run
/// use apidriver_core::{ApiDriver, CallData, DriverConfig};
/// use serde_json::json;
///
/// # async fn run() -> apidriver_core::Result<()> {
/// let driver = ApiDriver::new(
///     DriverConfig::builder()
///         .base_url("https://api.example.com")
///         .routes(json!({"users": {"get": {"method": "GET", "uri": "/users/{id}"}}}))
///         .build(),
/// )?;
///
/// let result = driver.call("users.get", CallData::new().param("id", 5)).await?;
/// if let Some(error) = result.error() {
///     eprintln!("failed: {error}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct ApiDriver {
    context: Arc<DriverContext>,
    registry: RouteRegistry,
    routes: Namespace,
}

impl ApiDriver {
    /// Load the routes, build the registry and the endpoint tree.
    pub fn new(config: DriverConfig) -> Result<Self> {
        let document = match config.routes {
            Some(RoutesSource::Document(document)) => document,
            Some(RoutesSource::Path(path)) => ConfigLoader::auto(&path)?.load_file(&path)?,
            None => return Err(RouteError::RoutesNotDefined),
        };
        ConfigValidator::is_object(&document, "routes")?;
        if let Some(base_url) = config.base_url.as_deref().filter(|b| !b.is_empty()) {
            ConfigValidator::is_url(base_url, "base_url")?;
        }

        let context = Arc::new(DriverContext {
            http: HttpClient::new(config.http)?,
            session: RwLock::new(SessionState {
                base_url: config.base_url,
                token: config.token,
            }),
            transform: config.transform_response_body,
            verbose: config.verbose,
            multi_args: config.multi_args,
        });

        let mut builder = TreeBuilder::new(context.clone(), config.custom_implementations);
        let mut registry = RouteRegistry::new();
        registry.initialize(&document, config.uri_template, |descriptor| {
            builder.on_route_config_created(descriptor)
        })?;

        Ok(Self {
            context,
            registry,
            routes: builder.finish(),
        })
    }

    /// Root of the generated namespace.
    pub fn routes(&self) -> &Namespace {
        &self.routes
    }

    /// Endpoint at a dotted path, e.g. `users.get`.
    pub fn endpoint(&self, path: &str) -> Option<&Endpoint> {
        self.routes.resolve(path)
    }

    /// The route registry.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Render the plan of a named route without sending it.
    pub fn render(&self, name: &str, data: &CallData) -> Result<RequestPlan> {
        self.registry
            .get_route_json(name, data)?
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))
    }

    /// Call a route by qualified name.
    pub async fn call(&self, name: &str, data: impl Into<CallData>) -> Result<NormalizedResult> {
        self.endpoint(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?
            .call(data)
            .await
    }

    /// Send an already rendered plan on behalf of `route`.
    pub async fn send(&self, route: &str, plan: RequestPlan) -> Result<NormalizedResult> {
        self.context.send(route, plan, BodyEncoding::Auto).await
    }

    /// Send a plan directly, bypassing route lookup. The body is always JSON.
    pub async fn send_async(&self, plan: RequestPlan) -> Result<NormalizedResult> {
        let route = plan.uri.clone();
        self.context.send(&route, plan, BodyEncoding::Json).await
    }

    /// Replace the bearer token. Empty tokens are rejected.
    pub fn set_access_token(&self, token: impl Into<String>) -> Result<&Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(RouteError::MissingToken);
        }
        self.context.session.write().token = Some(token);
        Ok(self)
    }

    /// Current bearer token.
    pub fn access_token(&self) -> Option<String> {
        self.context.session.read().token.clone()
    }

    /// Replace the base URL. An empty string means no base.
    pub fn set_base_url(&self, url: impl Into<String>) {
        self.context.session.write().base_url = Some(url.into());
    }

    /// Current base URL; redirects may have changed it.
    pub fn base_url(&self) -> Option<String> {
        self.context.session.read().base_url.clone()
    }

    /// Whether verbose call logging is on.
    pub fn is_verbose(&self) -> bool {
        self.context.verbose
    }

    /// Whether [`Endpoint::call_output`] spreads results.
    pub fn multi_args(&self) -> bool {
        self.context.multi_args
    }
}

impl fmt::Debug for ApiDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiDriver")
            .field("base_url", &self.base_url())
            .field("routes", &self.registry.len())
            .finish()
    }
}
