//! Bulk `INSERT INTO ... VALUES` rendering.

use std::collections::HashMap;

use quarry_common::{QuarryError, QuarryResult, Value};
use tracing::debug;

use crate::schema::TableSchema;
use crate::types::{Serializer, TypeRegistry};

/// One row to insert.
///
/// Rows are resolved against the schema's regular columns followed by its
/// partition columns. Values not supplied are inserted as `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Values by position.
    Positional(Vec<Value>),
    /// Values by column name.
    Named(HashMap<String, Value>),
}

impl Row {
    /// Builds a named row from `(column, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Row::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Resolves the row into one value per schema column.
    pub fn resolve(&self, schema: &TableSchema) -> QuarryResult<Vec<Value>> {
        let width = schema.columns().len() + schema.partitions().len();
        match self {
            Row::Positional(values) => {
                if values.len() > width {
                    return Err(QuarryError::invalid_argument(format!(
                        "row has {} values but the table has {width} columns",
                        values.len()
                    )));
                }
                let mut resolved = values.clone();
                resolved.resize(width, Value::Null);
                Ok(resolved)
            }
            Row::Named(values) => {
                if let Some(unknown) = values
                    .keys()
                    .find(|name| !schema.all_columns().any(|c| &c.name == *name))
                {
                    return Err(QuarryError::invalid_argument(format!(
                        "unknown column '{unknown}'"
                    )));
                }
                Ok(schema
                    .all_columns()
                    .map(|column| values.get(&column.name).cloned().unwrap_or(Value::Null))
                    .collect())
            }
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::Positional(values)
    }
}

impl From<HashMap<String, Value>> for Row {
    fn from(values: HashMap<String, Value>) -> Self {
        Row::Named(values)
    }
}

/// Renders insert statements with the registry's literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertGenerator {
    registry: TypeRegistry,
}

impl InsertGenerator {
    /// Creates a generator using the given registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    /// Renders one statement inserting every row.
    ///
    /// ```text
    /// INSERT INTO events VALUES
    /// (1, 'a'),
    /// (2, NULL)
    /// ```
    pub fn insert_sql(
        &self,
        table: &str,
        schema: &TableSchema,
        rows: &[Row],
    ) -> QuarryResult<String> {
        if rows.is_empty() {
            return Err(QuarryError::invalid_argument("no rows to insert"));
        }

        let serializers = schema
            .all_columns()
            .map(|column| self.registry.serializer_for(&column.column_type))
            .collect::<QuarryResult<Vec<Serializer>>>()?;

        let tuples = rows
            .iter()
            .map(|row| {
                let values = row.resolve(schema)?;
                let literals = serializers
                    .iter()
                    .zip(&values)
                    .map(|(serializer, value)| serializer.literal(value))
                    .collect::<QuarryResult<Vec<_>>>()?;
                Ok(format!("({})", literals.join(", ")))
            })
            .collect::<QuarryResult<Vec<_>>>()?;

        debug!(table, rows = tuples.len(), "rendered insert statement");
        Ok(format!("INSERT INTO {table} VALUES\n{}", tuples.join(",\n")))
    }
}
