// Configuration validation

use crate::{ConfigError, Result};

/// Stateless validation rules
#[derive(Debug)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate URL format
    pub fn is_url(value: &str, field: &str) -> Result<()> {
        if !value.starts_with("http://") && !value.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "{} must be a valid URL",
                field
            )));
        }
        Ok(())
    }

    /// Validate that a value is a JSON object, returning it
    pub fn is_object<'a>(
        value: &'a serde_json::Value,
        field: &str,
    ) -> Result<&'a serde_json::Map<String, serde_json::Value>> {
        value.as_object().ok_or_else(|| {
            ConfigError::ValidationError(format!("{} must be an object", field))
        })
    }
}
