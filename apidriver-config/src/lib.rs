// Configuration loading for apidriver

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::{EnvLoader, EnvOverrides, ENV_PREFIX};
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::ConfigValidator;
