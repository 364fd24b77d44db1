//! Query execution state.
//!
//! ```text
//!  Queued ──▶ Running ──┬──▶ Finished
//!                       ├──▶ Failed
//!                       └──▶ Cancelled
//! ```
//!
//! The three right-hand states are terminal. A [`QueryExecution`] is a
//! snapshot: it is refreshed only by polling the engine again.

use std::fmt;

use quarry_common::{ColumnType, QuarryError, QuarryResult, Value};
use quarry_sql::OutputParser;

use crate::downloader::OutputDownloader;
use crate::engine::{ObjectStore, RawQueryStatus};
use crate::location::OutputLocation;

/// Lifecycle state of a query execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryState {
    /// Waiting for capacity.
    Queued,
    /// Executing.
    Running,
    /// Completed successfully.
    Finished,
    /// Completed with an error.
    Failed,
    /// Cancelled before completion.
    Cancelled,
}

impl QueryState {
    /// Maps an engine state token.
    ///
    /// Tokens outside the known set fail with `UnsupportedStatus`.
    pub fn from_raw(state: &str) -> QuarryResult<Self> {
        match state {
            "QUEUED" => Ok(QueryState::Queued),
            "RUNNING" => Ok(QueryState::Running),
            "SUCCEEDED" => Ok(QueryState::Finished),
            "FAILED" => Ok(QueryState::Failed),
            "CANCELLED" => Ok(QueryState::Cancelled),
            other => Err(QuarryError::UnsupportedStatus {
                status: other.to_string(),
            }),
        }
    }

    /// Returns the state name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryState::Queued => "queued",
            QueryState::Running => "running",
            QueryState::Finished => "finished",
            QueryState::Failed => "failed",
            QueryState::Cancelled => "cancelled",
        }
    }

    /// Returns true for `Queued` and `Running`.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, QueryState::Queued | QueryState::Running)
    }

    /// Returns true for `Finished`, `Failed` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a query execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExecution {
    id: String,
    state: QueryState,
    reason: Option<String>,
    output_location: Option<OutputLocation>,
}

impl QueryExecution {
    /// Creates a snapshot.
    pub fn new(
        id: impl Into<String>,
        state: QueryState,
        reason: Option<String>,
        output_location: Option<OutputLocation>,
    ) -> Self {
        Self {
            id: id.into(),
            state,
            reason,
            output_location,
        }
    }

    /// Interprets a raw engine status.
    pub fn from_raw(id: impl Into<String>, raw: RawQueryStatus) -> QuarryResult<Self> {
        let state = QueryState::from_raw(&raw.state)?;
        let output_location = raw
            .output_location
            .as_deref()
            .map(OutputLocation::parse)
            .transpose()?;
        Ok(Self::new(id, state, raw.reason, output_location))
    }

    /// Execution id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    pub fn state(&self) -> QueryState {
        self.state
    }

    /// Reason of the last state change, if the engine gave one.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Location of the result file.
    pub fn output_location(&self) -> Option<&OutputLocation> {
        self.output_location.as_ref()
    }

    /// Returns true if queued.
    pub fn is_queued(&self) -> bool {
        self.state == QueryState::Queued
    }

    /// Returns true if running.
    pub fn is_running(&self) -> bool {
        self.state == QueryState::Running
    }

    /// Returns true if finished successfully.
    pub fn is_finished(&self) -> bool {
        self.state == QueryState::Finished
    }

    /// Returns true if failed.
    pub fn is_failed(&self) -> bool {
        self.state == QueryState::Failed
    }

    /// Returns true if cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.state == QueryState::Cancelled
    }

    /// Returns true if queued or running.
    pub fn is_in_progress(&self) -> bool {
        self.state.is_in_progress()
    }

    /// Returns true if no further state change can happen.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Downloads the result file and decodes it with `types`.
    pub async fn fetch_result(
        &self,
        store: &dyn ObjectStore,
        parser: &OutputParser,
        types: &[ColumnType],
    ) -> QuarryResult<Vec<Vec<Value>>> {
        let location = self.require_output_location()?;
        let grid = OutputDownloader::new().download(store, location).await?;
        parser.parse(&grid, types)
    }

    pub(crate) fn require_output_location(&self) -> QuarryResult<&OutputLocation> {
        self.output_location
            .as_ref()
            .ok_or_else(|| QuarryError::Storage {
                message: format!("query {} has no output location", self.id),
            })
    }
}
