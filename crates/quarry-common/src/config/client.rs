//! Client configuration structures.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuarryError, QuarryResult};

/// Query client configuration.
///
/// # Example
///
/// ```rust
/// use quarry_common::config::{ClientConfig, TypeFallback};
///
/// let config = ClientConfig::new()
///     .work_group("analytics")
///     .type_fallback(TypeFallback::Passthrough);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Work group used when a query does not name one.
    pub work_group: Option<String>,

    /// Output location used when a query does not name one.
    /// When unset the engine's work group default applies.
    pub output_location: Option<String>,

    /// Bucket holding sandboxed tables and databases.
    pub sandbox_bucket: Option<String>,

    /// Delay policy between status polls.
    pub backoff: BackoffConfig,

    /// What the type registry does with column types it has no serializer for.
    pub type_fallback: TypeFallback,
}

impl ClientConfig {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> QuarryResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| QuarryError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    pub fn from_file(path: &Path) -> QuarryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Sets the default work group.
    #[must_use]
    pub fn work_group(mut self, work_group: impl Into<String>) -> Self {
        self.work_group = Some(work_group.into());
        self
    }

    /// Sets the default output location.
    #[must_use]
    pub fn output_location(mut self, location: impl Into<String>) -> Self {
        self.output_location = Some(location.into());
        self
    }

    /// Sets the sandbox bucket.
    #[must_use]
    pub fn sandbox_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.sandbox_bucket = Some(bucket.into());
        self
    }

    /// Sets the backoff policy.
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the type fallback policy.
    #[must_use]
    pub fn type_fallback(mut self, fallback: TypeFallback) -> Self {
        self.type_fallback = fallback;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> QuarryResult<()> {
        for (field, value) in [
            ("work_group", &self.work_group),
            ("output_location", &self.output_location),
            ("sandbox_bucket", &self.sandbox_bucket),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(QuarryError::InvalidConfig {
                    message: format!("{field} must not be empty"),
                });
            }
        }

        if self.sandbox_bucket.as_deref().is_some_and(|b| b.contains('/')) {
            return Err(QuarryError::InvalidConfig {
                message: "sandbox_bucket must be a bare bucket name".to_string(),
            });
        }

        self.backoff.validate()
    }
}

/// Exponential backoff between status polls.
///
/// The delay before poll `attempt` (starting at 1) is `base^attempt - 1`
/// seconds, optionally capped at `max_delay_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Growth factor. Default: 1.5
    pub base: f64,

    /// Upper bound of a single delay in seconds. Default: unbounded
    pub max_delay_secs: Option<f64>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base: 1.5,
            max_delay_secs: None,
        }
    }
}

impl BackoffConfig {
    /// Returns the delay before the given poll attempt.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let mut secs = self.base.powi(exponent) - 1.0;
        if let Some(max) = self.max_delay_secs {
            secs = secs.min(max);
        }
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Validates the backoff parameters.
    pub fn validate(&self) -> QuarryResult<()> {
        if !self.base.is_finite() || self.base < 1.0 {
            return Err(QuarryError::InvalidConfig {
                message: format!("backoff.base must be at least 1.0, got {}", self.base),
            });
        }
        if self
            .max_delay_secs
            .is_some_and(|max| !max.is_finite() || max < 0.0)
        {
            return Err(QuarryError::InvalidConfig {
                message: "backoff.max_delay_secs must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }
}

/// Behavior of the type registry for column types without a serializer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFallback {
    /// Fail with `UnsupportedType`.
    #[default]
    Strict,
    /// Use the passthrough default serializer.
    Passthrough,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_backoff() {
        let backoff = BackoffConfig::default();
        assert_eq!(backoff.delay(1), Duration::from_millis(500));
        assert_eq!(backoff.delay(2), Duration::from_millis(1250));
        assert!(backoff.delay(3) > backoff.delay(2));
    }

    #[test]
    fn test_backoff_cap() {
        let backoff = BackoffConfig {
            base: 2.0,
            max_delay_secs: Some(3.0),
        };
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(10), Duration::from_secs(3));
    }

    #[test]
    fn test_backoff_overflow_saturates() {
        let backoff = BackoffConfig {
            base: 10.0,
            max_delay_secs: None,
        };
        assert_eq!(backoff.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::new()
            .work_group("primary")
            .output_location("s3://results/queries/")
            .sandbox_bucket("sandbox");

        assert_eq!(config.work_group.as_deref(), Some("primary"));
        assert_eq!(config.type_fallback, TypeFallback::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new().work_group("  ").validate().is_err());
        assert!(ClientConfig::new()
            .sandbox_bucket("bucket/path")
            .validate()
            .is_err());
        let config = ClientConfig::new().backoff(BackoffConfig {
            base: 0.5,
            max_delay_secs: None,
        });
        assert!(matches!(
            config.validate(),
            Err(QuarryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_from_toml() {
        let config = ClientConfig::from_toml_str(
            r#"
            work_group = "etl"
            type_fallback = "passthrough"

            [backoff]
            base = 2.0
            max_delay_secs = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.work_group.as_deref(), Some("etl"));
        assert_eq!(config.type_fallback, TypeFallback::Passthrough);
        assert_eq!(config.backoff.max_delay_secs, Some(30.0));
        assert!(config.sandbox_bucket.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sandbox_bucket = \"test-bucket\"").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.sandbox_bucket.as_deref(), Some("test-bucket"));
        assert_eq!(config.backoff, BackoffConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = ClientConfig::from_toml_str("type_fallback = \"lenient\"").unwrap_err();
        assert!(matches!(err, QuarryError::InvalidConfig { .. }));
    }
}
