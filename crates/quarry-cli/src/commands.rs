//! Subcommand implementations.
//!
//! Every command is offline: it reads local files and prints SQL or
//! decoded rows without contacting an engine.

use std::path::Path;

use anyhow::{Context, Result};
use quarry_client::downloader::parse_csv;
use quarry_common::ColumnType;
use quarry_sql::{OutputParser, PartitionsGenerator, TableDdlGenerator, TypeRegistry};
use tracing::{debug, info, warn};

use crate::definition::{load_partition_values, TableDefinition};
use crate::formatter::{format_result, OutputFormat, ResultSet};

/// Renders the `CREATE EXTERNAL TABLE` statement of a definition file.
pub fn ddl(table: &Path, strict: bool) -> Result<String> {
    let definition = TableDefinition::from_file(table)?;
    let schema = definition.schema()?;
    let format = definition.format.to_descriptor()?;

    info!(table = %definition.name, strict, "generating table DDL");
    Ok(TableDdlGenerator::new().create_table_sql(
        &definition.name,
        &schema,
        &definition.location,
        &format,
        !strict,
    ))
}

/// Renders the `ALTER TABLE ... ADD PARTITION` statement for a values file.
pub fn partitions(table: &Path, values: &Path, strict: bool) -> Result<String> {
    let definition = TableDefinition::from_file(table)?;
    let set = load_partition_values(values)?;

    let schema = definition.schema()?;
    let declared = schema.partition_names();
    for name in set.names().filter(|name| !declared.contains(name)) {
        warn!(table = %definition.name, partition = name, "partition not declared by table");
    }

    info!(
        table = %definition.name,
        combinations = set.combination_count(),
        "generating partition statement"
    );
    Ok(PartitionsGenerator::new().to_sql(&definition.name, &set, !strict)?)
}

/// Decodes a downloaded result file.
pub fn render(
    file: &Path,
    types: &[ColumnType],
    registry: TypeRegistry,
    format: OutputFormat,
) -> Result<String> {
    let body = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let grid = parse_csv(&body)?;

    let columns = grid.first().cloned().unwrap_or_default();
    let rows = OutputParser::new(registry).parse(&grid, types)?;
    debug!(rows = rows.len(), "decoded result file");

    format_result(&ResultSet { columns, rows }, format)
}
