use serde::{Deserialize, Serialize};

use super::error::{EstimateError, ValidationError};

/// Tunables for the engine. Missing fields take their defaults.
///
/// ```
/// use offerta::core::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "max_allocation_attempts": 8 }"#).unwrap();
/// assert_eq!(config.max_allocation_attempts, 8);
/// assert_eq!(config.copy_suffix, " (Copy)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Conditional-write attempts before allocation gives up.
    pub max_allocation_attempts: u32,
    /// Appended to the customer name of a duplicated estimate.
    pub copy_suffix: String,
    /// Days from creation until a new estimate expires, unless given.
    pub default_validity_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_allocation_attempts: 5,
            copy_suffix: " (Copy)".into(),
            default_validity_days: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self, EstimateError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EstimateError::Validation(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        let mut errors = Vec::new();
        if self.max_allocation_attempts == 0 {
            errors.push(ValidationError::new(
                "max_allocation_attempts",
                "at least one allocation attempt is required",
            ));
        }
        if self.default_validity_days > 3650 {
            errors.push(ValidationError::new(
                "default_validity_days",
                "validity period cannot exceed ten years",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EstimateError::from_findings(&errors))
        }
    }

    pub fn with_max_allocation_attempts(mut self, attempts: u32) -> Self {
        self.max_allocation_attempts = attempts;
        self
    }

    pub fn with_copy_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_suffix = suffix.into();
        self
    }

    pub fn with_default_validity_days(mut self, days: u32) -> Self {
        self.default_validity_days = days;
        self
    }
}
