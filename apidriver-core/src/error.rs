//! Route configuration error types.

use apidriver_config::ConfigError;
use apidriver_http_client::HttpClientError;
use thiserror::Error;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Configuration errors.
///
/// These are raised synchronously, at construction or before any network I/O
/// for a call. Transport and application failures never show up here; they are
/// folded into [`NormalizedResult::error`](crate::NormalizedResult::error).
#[derive(Debug, Error)]
pub enum RouteError {
    /// No routes document was supplied.
    #[error("Routes configuration file not defined")]
    RoutesNotDefined,

    /// The routes document does not have the expected shape.
    #[error("Malformed routes configuration: {0}")]
    MalformedRoutes(String),

    /// No route is registered under this name.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// Neither the route nor the call data supplied a URI.
    #[error("Missing uri param for route {0}")]
    MissingUri(String),

    /// Neither the route nor the call data supplied a method.
    #[error("Missing method param for route {0}")]
    MissingMethod(String),

    /// The method is not a valid HTTP token.
    #[error("Invalid method {method:?} for route {route}")]
    InvalidMethod {
        /// Qualified route name.
        route: String,
        /// Offending method string.
        method: String,
    },

    /// A URI placeholder has no value in the call data.
    #[error("Missing value for placeholder {{{name}}} in route {route}")]
    MissingParameter {
        /// Qualified route name.
        route: String,
        /// Placeholder name.
        name: String,
    },

    /// A route names a custom implementation that was not provided.
    #[error("Couldn't find \"{implementation}\" in custom implementations. Route: {route}")]
    MissingCustomImplementation {
        /// Qualified route name.
        route: String,
        /// Implementation name from the route configuration.
        implementation: String,
    },

    /// Two routes disagree about whether a path is a namespace or an endpoint.
    #[error("Route {route} conflicts with an existing entry at {path}")]
    NamespaceConflict {
        /// Qualified route name being attached.
        route: String,
        /// Dotted path where the conflict happened.
        path: String,
    },

    /// The request URL could not be resolved against the base URL.
    #[error("Invalid URL for route {route}: {message}")]
    InvalidUrl {
        /// Qualified route name.
        route: String,
        /// Parser message.
        message: String,
    },

    /// An empty access token was supplied.
    #[error("Missing token.")]
    MissingToken,

    /// Document loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP transport could not be constructed.
    #[error(transparent)]
    Http(#[from] HttpClientError),
}
