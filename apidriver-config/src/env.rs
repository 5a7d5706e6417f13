// Environment variable overrides

use crate::{ConfigError, Result};
use std::env;
use std::path::Path;

/// Prefix shared by every apidriver environment variable.
pub const ENV_PREFIX: &str = "APIDRIVER";

/// Environment variable loader
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
}

/// Driver settings read from the environment.
///
/// Every field is optional; unset variables leave the corresponding builder
/// value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `APIDRIVER_BASE_URL`
    pub base_url: Option<String>,
    /// `APIDRIVER_TOKEN`
    pub token: Option<String>,
    /// `APIDRIVER_VERBOSE` (`1` or `true`)
    pub verbose: Option<bool>,
    /// `APIDRIVER_ROUTES`, path to a JSON or TOML routes document
    pub routes: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Loader bound to [`ENV_PREFIX`]
    pub fn apidriver() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }

    fn full_key(&self, key: &str) -> String {
        if let Some(ref prefix) = self.prefix {
            format!("{}_{}", prefix, key.to_uppercase())
        } else {
            key.to_uppercase()
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    /// Load a variable, treating absence as `None`
    pub fn load_opt(&self, key: &str) -> Option<String> {
        self.load_var(key).ok().filter(|v| !v.is_empty())
    }

    /// Load a `.env` file into the process environment.
    ///
    /// Without a path, `.env` in the working directory is loaded when it
    /// exists. An explicit path must exist.
    pub fn load_dotenv(path: Option<&Path>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok();
        }
        Ok(())
    }

    /// Collect the driver overrides
    pub fn overrides(&self) -> EnvOverrides {
        EnvOverrides {
            base_url: self.load_opt("BASE_URL"),
            token: self.load_opt("TOKEN"),
            verbose: self
                .load_opt("VERBOSE")
                .map(|v| v == "1" || v.to_lowercase() == "true"),
            routes: self.load_opt("ROUTES"),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::apidriver()
    }
}
