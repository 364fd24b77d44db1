//! Table handles.

use quarry_common::{QuarryResult, Value};
use quarry_sql::ddl::{repair_table_sql, select_all_sql};
use quarry_sql::{
    FormatDescriptor, InsertGenerator, OutputParser, PartitionValueSet, PartitionsGenerator, Row,
    TableDdlGenerator, TableSchema,
};
use tracing::info;

use crate::client::QueryOptions;
use crate::database::Database;
use crate::location::OutputLocation;
use crate::wiper::TableDataWiper;

/// Handle to an external table.
///
/// Every statement runs synchronously in the owning database's context.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    database: Database<'a>,
    name: String,
    schema: TableSchema,
    location: String,
    format: FormatDescriptor,
}

impl<'a> Table<'a> {
    pub(crate) fn new(
        database: Database<'a>,
        name: impl Into<String>,
        schema: TableSchema,
        location: impl Into<String>,
        format: FormatDescriptor,
    ) -> Self {
        Self {
            database,
            name: name.into(),
            schema,
            location: location.into(),
            format,
        }
    }

    /// Replaces the data format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<FormatDescriptor>) -> Self {
        self.format = format.into();
        self
    }

    /// The owning database.
    pub fn database(&self) -> &Database<'a> {
        &self.database
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Data format.
    pub fn format(&self) -> &FormatDescriptor {
        &self.format
    }

    /// Storage location as seen by the engine.
    pub fn location(&self) -> QuarryResult<String> {
        self.database.client().mode().translate_path(&self.location)
    }

    /// Creates the table unless it exists.
    pub async fn create(&self) -> QuarryResult<()> {
        self.run_create(true).await
    }

    /// Creates the table, failing if it exists.
    pub async fn create_strict(&self) -> QuarryResult<()> {
        self.run_create(false).await
    }

    async fn run_create(&self, permissive: bool) -> QuarryResult<()> {
        let location = self.location()?;
        info!(
            database = self.database.name(),
            table = %self.name,
            location = %location,
            "creating table"
        );
        let sql = TableDdlGenerator::new().create_table_sql(
            &self.name,
            &self.schema,
            &location,
            &self.format,
            permissive,
        );
        self.run(&sql).await
    }

    /// Adds every combination of the given partition values, skipping
    /// existing partitions.
    pub async fn add_partitions(&self, partitions: &PartitionValueSet) -> QuarryResult<()> {
        let sql = PartitionsGenerator::new().to_sql(&self.name, partitions, true)?;
        self.run(&sql).await
    }

    /// Adds every combination of the given partition values, failing if
    /// one exists.
    pub async fn add_partitions_strict(&self, partitions: &PartitionValueSet) -> QuarryResult<()> {
        let sql = PartitionsGenerator::new().to_sql(&self.name, partitions, false)?;
        self.run(&sql).await
    }

    /// Lets the engine discover partitions by scanning the table location.
    pub async fn discover_partitions(&self) -> QuarryResult<()> {
        self.run(&repair_table_sql(&self.name)).await
    }

    /// Inserts rows.
    pub async fn upload_data(&self, rows: &[Row]) -> QuarryResult<()> {
        let registry = self.database.client().registry();
        let sql = InsertGenerator::new(registry).insert_sql(&self.name, &self.schema, rows)?;
        self.run(&sql).await
    }

    /// Reads every row, decoded with the types of the columns followed by
    /// the partition columns.
    pub async fn download_data(&self) -> QuarryResult<Vec<Vec<Value>>> {
        let client = self.database.client();
        let execution = self
            .database
            .execute_query(&select_all_sql(&self.name), QueryOptions::sync())
            .await?;
        let grid = client.download(&execution).await?;
        OutputParser::new(client.registry()).parse(&grid, &self.schema.column_types())
    }

    /// Deletes the table's files, or only those of the given partitions.
    ///
    /// Returns the deleted key prefixes.
    pub async fn wipe_data(&self, partitions: Option<&PartitionValueSet>) -> QuarryResult<Vec<String>> {
        let location = OutputLocation::parse(&self.location()?)?;
        let partition_names = self.schema.partition_names();
        TableDataWiper::new()
            .wipe(
                self.database.client().store(),
                &location,
                &partition_names,
                partitions,
            )
            .await
    }

    async fn run(&self, sql: &str) -> QuarryResult<()> {
        self.database
            .execute_query(sql, QueryOptions::sync())
            .await?;
        Ok(())
    }
}
