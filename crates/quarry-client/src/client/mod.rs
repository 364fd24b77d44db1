//! The query executor.
//!
//! Provides the main `Client` struct for submitting queries, tracking their
//! execution and opening database handles.

use std::fmt;
use std::sync::Arc;

use quarry_common::{ClientConfig, ColumnType, QuarryError, QuarryResult, Value};
use quarry_sql::{OutputParser, TypeRegistry};
use tracing::{debug, warn};

use crate::database::Database;
use crate::downloader::OutputDownloader;
use crate::engine::{ObjectStore, QueryEngine, StartQueryRequest};
use crate::execution::QueryExecution;
use crate::mode::{ExecutionMode, StandardMode};
use crate::poller::{wait_until_terminal, Backoff};

/// Per-query options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Work group; falls back to the configured default.
    pub work_group: Option<String>,
    /// Database the query runs against.
    pub database: Option<String>,
    /// Result location; falls back to the configured default.
    pub output_location: Option<String>,
    /// Return right after submission instead of waiting.
    pub is_async: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            work_group: None,
            database: None,
            output_location: None,
            is_async: true,
        }
    }
}

impl QueryOptions {
    /// Asynchronous options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that wait for the query to finish.
    pub fn sync() -> Self {
        Self {
            is_async: false,
            ..Self::default()
        }
    }

    /// Sets the work group.
    #[must_use]
    pub fn work_group(mut self, work_group: impl Into<String>) -> Self {
        self.work_group = Some(work_group.into());
        self
    }

    /// Sets the database.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the result location.
    #[must_use]
    pub fn output_location(mut self, url: impl Into<String>) -> Self {
        self.output_location = Some(url.into());
        self
    }

    /// Sets whether the call returns before the query finishes.
    #[must_use]
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }
}

/// Quarry client.
///
/// Cloning is cheap; clones share the collaborators and the mode.
#[derive(Clone)]
pub struct Client {
    engine: Arc<dyn QueryEngine>,
    store: Arc<dyn ObjectStore>,
    config: Arc<ClientConfig>,
    mode: Arc<dyn ExecutionMode>,
    backoff: Backoff,
    registry: TypeRegistry,
}

impl Client {
    /// Creates a client in standard mode.
    pub fn new(
        engine: Arc<dyn QueryEngine>,
        store: Arc<dyn ObjectStore>,
        config: ClientConfig,
    ) -> QuarryResult<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            store,
            backoff: Backoff::Exponential(config.backoff),
            registry: TypeRegistry::new(config.type_fallback),
            config: Arc::new(config),
            mode: Arc::new(StandardMode),
        })
    }

    /// Replaces the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Arc<dyn ExecutionMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the backoff between status polls.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the execution mode.
    pub fn mode(&self) -> &dyn ExecutionMode {
        self.mode.as_ref()
    }

    /// Returns the type registry.
    pub fn registry(&self) -> TypeRegistry {
        self.registry
    }

    /// Returns the object store.
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Opens a handle to a database. Nothing is sent to the engine.
    pub fn database(&self, name: impl Into<String>) -> Database<'_> {
        Database::new(self, name)
    }

    /// Submits a query and returns its execution id.
    pub async fn submit(&self, sql: &str, options: &QueryOptions) -> QuarryResult<String> {
        let request = StartQueryRequest {
            query: sql.to_string(),
            work_group: options
                .work_group
                .clone()
                .or_else(|| self.config.work_group.clone()),
            database: options
                .database
                .as_deref()
                .map(|name| self.mode.translate_name(name)),
            output_location: options
                .output_location
                .as_deref()
                .or(self.config.output_location.as_deref())
                .map(|url| self.mode.translate_path(url))
                .transpose()?,
        };

        let id = self
            .engine
            .start_query(request)
            .await
            .map_err(|e| QuarryError::Submission {
                reason: e.to_string(),
            })?;

        debug!(query_id = %id, sql, "submitted query");
        Ok(id)
    }

    /// Fetches the current state of an execution.
    pub async fn query_status(&self, id: &str) -> QuarryResult<QueryExecution> {
        let raw = self
            .engine
            .query_status(id)
            .await
            .map_err(|e| QuarryError::Transport {
                message: e.to_string(),
            })?;
        QueryExecution::from_raw(id, raw)
    }

    /// Polls an execution with the client's backoff until it is terminal.
    pub async fn wait(&self, id: &str) -> QuarryResult<QueryExecution> {
        wait_until_terminal(&self.backoff, move || self.query_status(id)).await
    }

    /// Submits a query and, unless it runs asynchronously, waits for it.
    ///
    /// An asynchronous call returns the state after a single poll. A
    /// synchronous call fails with `QueryExecution` carrying the engine's
    /// reason when the query does not finish successfully.
    pub async fn execute_query(
        &self,
        sql: &str,
        options: QueryOptions,
    ) -> QuarryResult<QueryExecution> {
        let id = self.submit(sql, &options).await?;

        if self.mode.resolve_async(options.is_async) {
            return self.query_status(&id).await;
        }

        let execution = self.wait(&id).await?;
        if !execution.is_finished() {
            warn!(query_id = %id, state = %execution.state(), reason = ?execution.reason(), "query did not finish");
            let reason = execution
                .reason()
                .map_or_else(|| format!("query {id} {}", execution.state()), str::to_string);
            return Err(QuarryError::QueryExecution { reason });
        }
        Ok(execution)
    }

    /// Downloads the raw result grid of an execution.
    pub async fn download(&self, execution: &QueryExecution) -> QuarryResult<Vec<Vec<String>>> {
        let location = execution.require_output_location()?;
        OutputDownloader::new()
            .download(self.store.as_ref(), location)
            .await
    }

    /// Downloads and decodes the result of an execution.
    pub async fn fetch_result(
        &self,
        execution: &QueryExecution,
        types: &[ColumnType],
    ) -> QuarryResult<Vec<Vec<Value>>> {
        execution
            .fetch_result(self.store.as_ref(), &OutputParser::new(self.registry), types)
            .await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("mode", &self.mode)
            .field("backoff", &self.backoff)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
