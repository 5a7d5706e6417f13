// apidriver - a configuration-driven HTTP API client
//
// Routes are declared in a JSON or TOML document and exposed as a tree of
// callable endpoints that return normalized results.

// Re-export core functionality
pub use apidriver_core::*;

// Re-export the supporting crates
pub use apidriver_config;
pub use apidriver_http_client;

pub use apidriver_http_client::{HttpClientConfig, HttpClientConfigBuilder};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ApiDriver, CallData, CallOutput, CustomImplementation, CustomImplementations,
        DriverConfig, DriverConfigBuilder, Endpoint, HttpClientConfig, Namespace,
        NormalizedResult, RequestPlan, Result, RouteError,
    };
}
