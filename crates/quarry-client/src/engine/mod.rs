//! Collaborator interfaces for the remote query engine and the object store.
//!
//! The client never talks to the network itself. It drives two traits:
//!
//! - `QueryEngine`: starts queries and reports their raw status
//! - `ObjectStore`: reads result files and deletes table data
//!
//! In-memory implementations of both live in [`memory`] and back the test
//! suites.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  start_query   ┌──────────────┐
//! │  Client  │───────────────▶│ QueryEngine  │
//! │          │◀───────────────│              │
//! └────┬─────┘  query_status  └──────────────┘
//!      │ get_object / delete_prefix
//!      ▼
//! ┌──────────────┐
//! │ ObjectStore  │
//! └──────────────┘
//! ```

pub mod memory;

pub use memory::{MemoryEngine, MemoryObjectStore};

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use thiserror::Error;

/// Boxed future returned by collaborator calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors reported by collaborators.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote side rejected the request.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The requested query or object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote side could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for collaborator calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Parameters of a query submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartQueryRequest {
    /// SQL text.
    pub query: String,
    /// Work group the query runs in.
    pub work_group: Option<String>,
    /// Database the query runs against.
    pub database: Option<String>,
    /// Where the engine writes the result file.
    pub output_location: Option<String>,
}

impl StartQueryRequest {
    /// Creates a request for the given SQL text.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

/// Status as reported by the engine, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawQueryStatus {
    /// Engine state token, e.g. `RUNNING`.
    pub state: String,
    /// Reason for the last state change.
    pub reason: Option<String>,
    /// Result file URI.
    pub output_location: Option<String>,
}

impl RawQueryStatus {
    /// Creates a status with the given state token.
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            reason: None,
            output_location: None,
        }
    }

    /// Sets the state change reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the result file URI.
    #[must_use]
    pub fn with_output_location(mut self, url: impl Into<String>) -> Self {
        self.output_location = Some(url.into());
        self
    }
}

/// Remote query engine.
pub trait QueryEngine: Send + Sync {
    /// Starts a query and returns its execution id.
    fn start_query(&self, request: StartQueryRequest) -> BoxFuture<'_, TransportResult<String>>;

    /// Fetches the current status of an execution.
    fn query_status<'a>(&'a self, id: &'a str) -> BoxFuture<'a, TransportResult<RawQueryStatus>>;
}

/// Object storage holding table data and query results.
pub trait ObjectStore: Send + Sync {
    /// Reads a whole object.
    fn get_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> BoxFuture<'a, TransportResult<Bytes>>;

    /// Deletes every object whose key starts with `prefix`.
    fn delete_prefix<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> BoxFuture<'a, TransportResult<()>>;
}
