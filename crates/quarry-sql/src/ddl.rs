//! DDL generation for external tables and databases.
//!
//! All statements are plain SQL text handed verbatim to the engine.
//! The `permissive` flag selects the existence guard (`IF NOT EXISTS` /
//! `IF EXISTS`); without it the engine fails on conflicting objects.

use crate::format::FormatDescriptor;
use crate::schema::{Column, TableSchema};
use crate::types::quote;

/// Generates `CREATE EXTERNAL TABLE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDdlGenerator;

impl TableDdlGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Renders the create statement for a table.
    ///
    /// The `PARTITIONED BY` block is omitted when the schema has no
    /// partition columns.
    ///
    /// # Example
    ///
    /// ```rust
    /// use quarry_common::ColumnType;
    /// use quarry_sql::ddl::TableDdlGenerator;
    /// use quarry_sql::format::{FormatDescriptor, FormatPreset};
    /// use quarry_sql::schema::TableSchema;
    ///
    /// let schema = TableSchema::builder()
    ///     .column("id", ColumnType::Int)
    ///     .build()
    ///     .unwrap();
    /// let sql = TableDdlGenerator::new().create_table_sql(
    ///     "events",
    ///     &schema,
    ///     "s3://bucket/events",
    ///     &FormatDescriptor::Preset(FormatPreset::Csv),
    ///     false,
    /// );
    /// assert!(sql.starts_with("CREATE EXTERNAL TABLE events ("));
    /// ```
    pub fn create_table_sql(
        &self,
        name: &str,
        schema: &TableSchema,
        location: &str,
        format: &FormatDescriptor,
        permissive: bool,
    ) -> String {
        let mut lines = vec![
            format!(
                "CREATE EXTERNAL TABLE {}{} (",
                if_not_exists(permissive),
                name
            ),
            column_definitions(schema.columns()),
            ")".to_string(),
        ];

        if !schema.partitions().is_empty() {
            lines.push("PARTITIONED BY (".to_string());
            lines.push(column_definitions(schema.partitions()));
            lines.push(")".to_string());
        }

        lines.push(format.to_sql());
        lines.push(format!("LOCATION {};", quote(location)));

        lines.join("\n")
    }
}

fn if_not_exists(permissive: bool) -> &'static str {
    if permissive {
        "IF NOT EXISTS "
    } else {
        ""
    }
}

fn if_exists(permissive: bool) -> &'static str {
    if permissive {
        "IF EXISTS "
    } else {
        ""
    }
}

fn column_definitions(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|column| format!("  `{}` {}", column.name, column.column_type))
        .collect::<Vec<_>>()
        .join(",\n")
}

/// `CREATE DATABASE` statement.
pub fn create_database_sql(name: &str, permissive: bool) -> String {
    format!("CREATE DATABASE {}{};", if_not_exists(permissive), name)
}

/// `DROP DATABASE ... CASCADE` statement.
pub fn drop_database_sql(name: &str, permissive: bool) -> String {
    format!("DROP DATABASE {}{} CASCADE;", if_exists(permissive), name)
}

/// `SHOW DATABASES LIKE` statement. The pattern is a regular expression.
pub fn show_databases_sql(pattern: &str) -> String {
    format!("SHOW DATABASES LIKE {};", quote(pattern))
}

/// Statement asking the engine to discover partitions by scanning the
/// table's location.
pub fn repair_table_sql(table: &str) -> String {
    format!("MSCK REPAIR TABLE {table};")
}

/// Statement reading every row of a table.
pub fn select_all_sql(table: &str) -> String {
    format!("SELECT * FROM {table};")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{FormatPreset, SerdeFormat};
    use quarry_common::ColumnType;

    fn schema() -> TableSchema {
        TableSchema::builder()
            .column("id", ColumnType::Int)
            .column("message", ColumnType::String)
            .column("time", ColumnType::Timestamp)
            .partition("dth", ColumnType::Int)
            .partition("type", ColumnType::String)
            .build()
            .unwrap()
    }

    #[test]
    fn test_create_table_with_partitions() {
        let sql = TableDdlGenerator::new().create_table_sql(
            "table",
            &schema(),
            "s3://bucket/file",
            &FormatDescriptor::default(),
            false,
        );

        assert_eq!(
            sql,
            "CREATE EXTERNAL TABLE table (\n\
             \x20 `id` int,\n\
             \x20 `message` string,\n\
             \x20 `time` timestamp\n\
             )\n\
             PARTITIONED BY (\n\
             \x20 `dth` int,\n\
             \x20 `type` string\n\
             )\n\
             ROW FORMAT DELIMITED FIELDS TERMINATED BY '\\t'\n\
             LOCATION 's3://bucket/file';"
        );
    }

    #[test]
    fn test_create_table_without_partitions() {
        let schema = TableSchema::builder()
            .column("id", ColumnType::Int)
            .build()
            .unwrap();
        let sql = TableDdlGenerator::new().create_table_sql(
            "table",
            &schema,
            "s3://bucket/file",
            &FormatPreset::Csv.into(),
            false,
        );

        assert!(!sql.contains("PARTITIONED BY"));
        assert_eq!(
            sql,
            "CREATE EXTERNAL TABLE table (\n  `id` int\n)\n\
             ROW FORMAT DELIMITED FIELDS TERMINATED BY ','\n\
             LOCATION 's3://bucket/file';"
        );
    }

    #[test]
    fn test_existence_guard() {
        let generator = TableDdlGenerator::new();
        let format = FormatDescriptor::default();

        let permissive = generator.create_table_sql("t", &schema(), "s3://b/k", &format, true);
        assert!(permissive.starts_with("CREATE EXTERNAL TABLE IF NOT EXISTS t ("));

        let strict = generator.create_table_sql("t", &schema(), "s3://b/k", &format, false);
        assert!(strict.starts_with("CREATE EXTERNAL TABLE t ("));
        assert!(!strict.contains("IF NOT EXISTS"));
    }

    #[test]
    fn test_end_to_end_example_order() {
        let schema = TableSchema::builder()
            .column("id", ColumnType::Int)
            .column("name", ColumnType::String)
            .partition("country", ColumnType::String)
            .build()
            .unwrap();
        let sql = TableDdlGenerator::new().create_table_sql(
            "people",
            &schema,
            "proto://b/k",
            &FormatPreset::Tsv.into(),
            true,
        );

        let positions: Vec<usize> = [
            "CREATE EXTERNAL TABLE IF NOT EXISTS people (",
            "`id` int,\n  `name` string",
            "PARTITIONED BY (\n  `country` string\n)",
            r"ROW FORMAT DELIMITED FIELDS TERMINATED BY '\t'",
            "LOCATION 'proto://b/k';",
        ]
        .iter()
        .map(|fragment| sql.find(fragment).expect(fragment))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(sql.ends_with("LOCATION 'proto://b/k';"));
    }

    #[test]
    fn test_serde_and_raw_formats() {
        let generator = TableDdlGenerator::new();
        let serde = SerdeFormat::new("com.example.Serde").property("a", "1");
        let sql = generator.create_table_sql("t", &schema(), "s3://b/k", &serde.into(), false);
        assert!(sql.contains(
            ")\nROW FORMAT SERDE 'com.example.Serde'\nWITH SERDEPROPERTIES (\n  'a' = '1'\n)\nLOCATION"
        ));

        let raw = FormatDescriptor::Raw("STORED AS PARQUET".to_string());
        let sql = generator.create_table_sql("t", &schema(), "s3://b/k", &raw, false);
        assert!(sql.contains(")\nSTORED AS PARQUET\nLOCATION 's3://b/k';"));
    }

    #[test]
    fn test_database_statements() {
        assert_eq!(
            create_database_sql("analytics", true),
            "CREATE DATABASE IF NOT EXISTS analytics;"
        );
        assert_eq!(create_database_sql("analytics", false), "CREATE DATABASE analytics;");
        assert_eq!(
            drop_database_sql("analytics", true),
            "DROP DATABASE IF EXISTS analytics CASCADE;"
        );
        assert_eq!(
            drop_database_sql("analytics", false),
            "DROP DATABASE analytics CASCADE;"
        );
        assert_eq!(
            show_databases_sql("abc.*"),
            "SHOW DATABASES LIKE 'abc.*';"
        );
        assert_eq!(repair_table_sql("events"), "MSCK REPAIR TABLE events;");
        assert_eq!(select_all_sql("events"), "SELECT * FROM events;");
    }
}
