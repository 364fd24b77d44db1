//! Storage format descriptors for external tables.

use std::fmt;
use std::str::FromStr;

use quarry_common::{QuarryError, QuarryResult};

use crate::types::quote;

const ORC_SERDE: &str = "org.apache.hadoop.hive.ql.io.orc.OrcSerde";
const ORC_INPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.orc.OrcInputFormat";
const ORC_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.orc.OrcOutputFormat";
const JSON_SERDE: &str = "org.apache.hive.hcatalog.data.JsonSerDe";

/// Named table format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatPreset {
    /// Comma-delimited text.
    Csv,
    /// Tab-delimited text.
    Tsv,
    /// ORC with columns resolved by name.
    Orc,
    /// ORC with columns resolved by position.
    OrcIndexAccess,
    /// JSON lines.
    Json,
}

impl FormatPreset {
    /// Returns the preset token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Orc => "orc",
            Self::OrcIndexAccess => "orc_index_access",
            Self::Json => "json",
        }
    }

    /// Renders the row format / storage clause of the preset.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Csv => "ROW FORMAT DELIMITED FIELDS TERMINATED BY ','".to_string(),
            Self::Tsv => "ROW FORMAT DELIMITED FIELDS TERMINATED BY '\\t'".to_string(),
            Self::Orc => SerdeFormat::new(ORC_SERDE)
                .property("orc.column.index.access", "false")
                .storage(ORC_INPUT_FORMAT, ORC_OUTPUT_FORMAT)
                .to_sql(),
            Self::OrcIndexAccess => "STORED AS ORC".to_string(),
            Self::Json => SerdeFormat::new(JSON_SERDE).to_sql(),
        }
    }
}

impl fmt::Display for FormatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatPreset {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "orc" => Ok(Self::Orc),
            "orc_index_access" => Ok(Self::OrcIndexAccess),
            "json" => Ok(Self::Json),
            _ => Err(QuarryError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// A custom serde-based format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerdeFormat {
    serde_class: String,
    properties: Vec<(String, String)>,
    storage: Option<(String, String)>,
}

impl SerdeFormat {
    /// Creates a format using the given serde class.
    pub fn new(serde_class: impl Into<String>) -> Self {
        Self {
            serde_class: serde_class.into(),
            properties: Vec::new(),
            storage: None,
        }
    }

    /// Adds a serde property. Properties render in insertion order.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Sets explicit input and output format classes.
    #[must_use]
    pub fn storage(mut self, input_format: impl Into<String>, output_format: impl Into<String>) -> Self {
        self.storage = Some((input_format.into(), output_format.into()));
        self
    }

    /// Renders the format clause.
    pub fn to_sql(&self) -> String {
        let mut lines = vec![format!("ROW FORMAT SERDE {}", quote(&self.serde_class))];

        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(key, value)| format!("  {} = {}", quote(key), quote(value)))
                .collect::<Vec<_>>()
                .join(",\n");
            lines.push(format!("WITH SERDEPROPERTIES (\n{properties}\n)"));
        }

        if let Some((input, output)) = &self.storage {
            lines.push(format!("STORED AS INPUTFORMAT {}", quote(input)));
            lines.push(format!("OUTPUTFORMAT {}", quote(output)));
        }

        lines.join("\n")
    }
}

/// How the table's files are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatDescriptor {
    /// One of the named presets.
    Preset(FormatPreset),
    /// A custom serde definition.
    Serde(SerdeFormat),
    /// A format clause inserted verbatim.
    Raw(String),
}

impl FormatDescriptor {
    /// Resolves a preset token, failing with `UnsupportedFormat`.
    pub fn preset(token: &str) -> QuarryResult<Self> {
        token.parse().map(Self::Preset)
    }

    /// Renders the row format / storage clause.
    pub fn to_sql(&self) -> String {
        match self {
            Self::Preset(preset) => preset.to_sql(),
            Self::Serde(serde) => serde.to_sql(),
            Self::Raw(clause) => clause.clone(),
        }
    }
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self::Preset(FormatPreset::Tsv)
    }
}

impl From<FormatPreset> for FormatDescriptor {
    fn from(preset: FormatPreset) -> Self {
        Self::Preset(preset)
    }
}

impl From<SerdeFormat> for FormatDescriptor {
    fn from(serde: SerdeFormat) -> Self {
        Self::Serde(serde)
    }
}
