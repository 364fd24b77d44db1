//! Object storage URIs.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use quarry_common::{QuarryError, QuarryResult};
use regex::Regex;

static LOCATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*)://([^/\s]+)/(\S+)$")
        .unwrap_or_else(|e| panic!("invalid location pattern: {e}"))
});

/// A `scheme://bucket/key` URI split into its parts.
///
/// The bucket must be non-empty and the key must be a non-empty remainder.
///
/// # Example
///
/// ```rust
/// use quarry_client::OutputLocation;
///
/// let location = OutputLocation::parse("s3://results/athena/q1.csv").unwrap();
/// assert_eq!(location.bucket(), "results");
/// assert_eq!(location.key(), "athena/q1.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputLocation {
    url: String,
    scheme: String,
    bucket: String,
    key: String,
}

impl OutputLocation {
    /// Parses a URI, failing with `MalformedLocation`.
    pub fn parse(url: &str) -> QuarryResult<Self> {
        let captures = LOCATION_PATTERN
            .captures(url)
            .ok_or_else(|| QuarryError::MalformedLocation {
                url: url.to_string(),
            })?;

        Ok(Self {
            url: url.to_string(),
            scheme: captures[1].to_string(),
            bucket: captures[2].to_string(),
            key: captures[3].to_string(),
        })
    }

    /// The full URI as given.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URI scheme, e.g. `s3`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key or key prefix.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl FromStr for OutputLocation {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
