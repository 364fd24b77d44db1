//! TOML table definitions and partition value files.
//!
//! A table definition looks like:
//!
//! ```toml
//! name = "events"
//! location = "s3://data/events/"
//! format = "csv"
//!
//! columns = [
//!     { name = "id", type = "int" },
//!     { name = "message", type = "string" },
//! ]
//! partitions = [{ name = "country", type = "string" }]
//! ```
//!
//! `format` is a preset token, `{ raw = "..." }`, or
//! `{ serde = "...", properties = [["key", "value"]], input_format = "...", output_format = "..." }`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use quarry_common::{ColumnType, Value};
use quarry_sql::{FormatDescriptor, PartitionValueSet, SerdeFormat, TableSchema};
use serde::Deserialize;

/// A column entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// The `format` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FormatDefinition {
    Preset(String),
    Raw {
        raw: String,
    },
    Serde {
        serde: String,
        #[serde(default)]
        properties: Vec<(String, String)>,
        input_format: Option<String>,
        output_format: Option<String>,
    },
}

impl Default for FormatDefinition {
    fn default() -> Self {
        FormatDefinition::Preset("tsv".to_string())
    }
}

impl FormatDefinition {
    pub fn to_descriptor(&self) -> Result<FormatDescriptor> {
        Ok(match self {
            FormatDefinition::Preset(token) => FormatDescriptor::preset(token)?,
            FormatDefinition::Raw { raw } => FormatDescriptor::Raw(raw.clone()),
            FormatDefinition::Serde {
                serde,
                properties,
                input_format,
                output_format,
            } => {
                let mut format = properties
                    .iter()
                    .fold(SerdeFormat::new(serde), |format, (key, value)| {
                        format.property(key, value)
                    });
                match (input_format, output_format) {
                    (Some(input), Some(output)) => format = format.storage(input, output),
                    (None, None) => {}
                    _ => bail!("input_format and output_format must be given together"),
                }
                FormatDescriptor::Serde(format)
            }
        })
    }
}

/// A table definition file.
#[derive(Debug, Clone, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub format: FormatDefinition,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub partitions: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("invalid table definition {}", path.display()))
    }

    pub fn schema(&self) -> Result<TableSchema> {
        let builder = self
            .columns
            .iter()
            .fold(TableSchema::builder(), |builder, c| {
                builder.column(&c.name, c.column_type.clone())
            });
        let builder = self
            .partitions
            .iter()
            .fold(builder, |builder, p| builder.partition(&p.name, p.column_type.clone()));
        Ok(builder.build()?)
    }
}

/// A literal in a partition values file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LiteralDefinition {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl From<LiteralDefinition> for Value {
    fn from(literal: LiteralDefinition) -> Self {
        match literal {
            LiteralDefinition::Integer(i) => Value::Integer(i),
            LiteralDefinition::Boolean(b) => Value::Boolean(b),
            LiteralDefinition::String(s) => Value::String(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PartitionEntry {
    name: String,
    values: Vec<LiteralDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
struct PartitionFile {
    #[serde(default)]
    partition: Vec<PartitionEntry>,
}

/// Reads a partition values file:
///
/// ```toml
/// [[partition]]
/// name = "country"
/// values = ["us", "mx"]
/// ```
pub fn load_partition_values(path: &Path) -> Result<PartitionValueSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_partition_values(&content)
}

pub fn parse_partition_values(content: &str) -> Result<PartitionValueSet> {
    let file: PartitionFile = toml::from_str(content).context("invalid partition values")?;
    Ok(file
        .partition
        .into_iter()
        .fold(PartitionValueSet::new(), |set, entry| {
            set.with(entry.name, entry.values)
        }))
}
