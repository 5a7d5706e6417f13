//! Configuration-driven HTTP API client.
//!
//! A routes document maps dotted names to request templates:
//!
//! ```json
//! {
//!   "users": {
//!     "get":    { "method": "GET",  "uri": "/users/{id}" },
//!     "create": { "method": "POST", "uri": "/users" }
//!   }
//! }
//! ```
//!
//! [`ApiDriver`] turns it into a [`RouteRegistry`] and a tree of callable
//! [`Endpoint`]s. A call renders the route with the caller's [`CallData`],
//! sends it, follows `302` redirects by rewriting the base URL, and folds the
//! outcome into a [`NormalizedResult`] of `error`, `body` and `status_code`.
//!
//! Only configuration problems surface as [`RouteError`]. Transport and
//! application failures are data in the result.

mod config;
mod custom;
mod data;
mod driver;
mod error;
mod executor;
mod namespace;
mod normalize;
mod registry;
mod result;
mod route;
mod template;

pub use config::{BasicAuth, PATH_SEPARATOR, RouteConfig, route_entries};
pub use custom::{CustomImplementation, CustomImplementations};
pub use data::CallData;
pub use driver::{
    ApiDriver, BoxError, DriverConfig, DriverConfigBuilder, RoutesSource, SessionState,
    TransformFn, json_transform,
};
pub use error::{Result, RouteError};
pub use namespace::{Endpoint, Namespace, Node};
pub use normalize::{TransportError, process_parsed, process_response};
pub use registry::RouteRegistry;
pub use result::{CallOutput, NormalizedResult};
pub use route::{RequestPlan, RouteDescriptor};
pub use template::{BraceTemplate, UriTemplate, VerbatimTemplate};

/// Prelude for common imports.
///
/// ```
/// use apidriver_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::custom::{CustomImplementation, CustomImplementations};
    pub use crate::data::CallData;
    pub use crate::driver::{ApiDriver, DriverConfig, DriverConfigBuilder};
    pub use crate::error::{Result, RouteError};
    pub use crate::namespace::{Endpoint, Namespace};
    pub use crate::result::{CallOutput, NormalizedResult};
    pub use crate::route::RequestPlan;
}
