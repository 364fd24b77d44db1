//! Database handles.

use quarry_common::QuarryResult;
use quarry_sql::ddl::{create_database_sql, drop_database_sql, show_databases_sql};
use quarry_sql::{FormatDescriptor, TableSchema};
use tracing::info;

use crate::client::{Client, QueryOptions};
use crate::execution::QueryExecution;
use crate::table::Table;

/// Handle to a database.
///
/// Queries run through a handle execute in the database's context, so
/// unqualified table names refer to this database. Metadata statements
/// always run synchronously.
#[derive(Debug, Clone)]
pub struct Database<'a> {
    client: &'a Client,
    name: String,
}

impl<'a> Database<'a> {
    pub(crate) fn new(client: &'a Client, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    /// Database name, before mode translation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client this handle runs on.
    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// Name as sent to the engine.
    fn engine_name(&self) -> String {
        self.client.mode().translate_name(&self.name)
    }

    /// Creates the database unless it exists.
    pub async fn create(&self) -> QuarryResult<()> {
        self.run_create(true).await
    }

    /// Creates the database, failing if it exists.
    pub async fn create_strict(&self) -> QuarryResult<()> {
        self.run_create(false).await
    }

    async fn run_create(&self, permissive: bool) -> QuarryResult<()> {
        info!(database = %self.name, "creating database");
        let sql = create_database_sql(&self.engine_name(), permissive);
        self.client.execute_query(&sql, QueryOptions::sync()).await?;
        Ok(())
    }

    /// Drops the database and its tables if it exists.
    pub async fn drop(&self) -> QuarryResult<()> {
        self.run_drop(true).await
    }

    /// Drops the database and its tables, failing if it does not exist.
    pub async fn drop_strict(&self) -> QuarryResult<()> {
        self.run_drop(false).await
    }

    async fn run_drop(&self, permissive: bool) -> QuarryResult<()> {
        info!(database = %self.name, "removing database");
        let sql = drop_database_sql(&self.engine_name(), permissive);
        self.client.execute_query(&sql, QueryOptions::sync()).await?;
        Ok(())
    }

    /// Returns true if the engine lists a database with this name.
    pub async fn exists(&self) -> QuarryResult<bool> {
        let name = self.engine_name();
        let execution = self
            .client
            .execute_query(&show_databases_sql(&name), QueryOptions::sync())
            .await?;
        let listing = self.client.download(&execution).await?;
        Ok(listing.into_iter().flatten().any(|listed| listed == name))
    }

    /// Executes a query in this database's context.
    ///
    /// An explicit database in `options` takes precedence.
    pub async fn execute_query(
        &self,
        sql: &str,
        mut options: QueryOptions,
    ) -> QuarryResult<QueryExecution> {
        if options.database.is_none() {
            options.database = Some(self.name.clone());
        }
        self.client.execute_query(sql, options).await
    }

    /// Fetches the current state of an execution.
    pub async fn query_status(&self, id: &str) -> QuarryResult<QueryExecution> {
        self.client.query_status(id).await
    }

    /// Opens a handle to a table in TSV format. Nothing is sent to the engine.
    pub fn table(
        &self,
        name: impl Into<String>,
        schema: TableSchema,
        location: impl Into<String>,
    ) -> Table<'a> {
        Table::new(self.clone(), name, schema, location, FormatDescriptor::default())
    }
}
