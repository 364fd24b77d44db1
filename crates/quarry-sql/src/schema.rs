//! Table schemas.
//!
//! A schema is an ordered list of regular columns plus an ordered list of
//! partition columns. Order is significant: it is preserved into generated
//! DDL and defines the positional layout of inserted and downloaded rows
//! (regular columns first, then partitions).

use std::collections::HashSet;

use quarry_common::{ColumnType, QuarryError, QuarryResult};

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub column_type: ColumnType,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Schema of an external table.
///
/// # Example
///
/// ```rust
/// use quarry_common::ColumnType;
/// use quarry_sql::schema::TableSchema;
///
/// let schema = TableSchema::builder()
///     .column("id", ColumnType::Int)
///     .column("message", ColumnType::String)
///     .partition("country", ColumnType::String)
///     .build()
///     .unwrap();
///
/// assert_eq!(schema.partition_names(), vec!["country"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<Column>,
    partitions: Vec<Column>,
}

impl TableSchema {
    /// Returns a schema builder.
    pub fn builder() -> TableSchemaBuilder {
        TableSchemaBuilder::default()
    }

    /// Creates a schema from column lists, validating name uniqueness.
    pub fn new(columns: Vec<Column>, partitions: Vec<Column>) -> QuarryResult<Self> {
        let schema = Self {
            columns,
            partitions,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Regular columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Partition columns in declaration order.
    pub fn partitions(&self) -> &[Column] {
        &self.partitions
    }

    /// Regular columns followed by partition columns.
    pub fn all_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().chain(self.partitions.iter())
    }

    /// Types of all columns, in row layout order.
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.all_columns().map(|c| c.column_type.clone()).collect()
    }

    /// Names of the partition columns.
    pub fn partition_names(&self) -> Vec<&str> {
        self.partitions.iter().map(|c| c.name.as_str()).collect()
    }

    fn validate(&self) -> QuarryResult<()> {
        let mut seen = HashSet::new();
        for column in self.all_columns() {
            if column.name.trim().is_empty() {
                return Err(QuarryError::InvalidSchema {
                    message: "column name must not be empty".to_string(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(QuarryError::InvalidSchema {
                    message: format!("duplicate column name '{}'", column.name),
                });
            }
        }
        Ok(())
    }
}

/// Builder for [`TableSchema`].
#[derive(Debug, Default)]
pub struct TableSchemaBuilder {
    columns: Vec<Column>,
    partitions: Vec<Column>,
}

impl TableSchemaBuilder {
    /// Appends a regular column.
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.push(Column::new(name, column_type));
        self
    }

    /// Appends a partition column.
    pub fn partition(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.partitions.push(Column::new(name, column_type));
        self
    }

    /// Builds the schema.
    pub fn build(self) -> QuarryResult<TableSchema> {
        TableSchema::new(self.columns, self.partitions)
    }
}
