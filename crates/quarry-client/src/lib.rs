//! # quarry-client
//!
//! Client for an asynchronous SQL engine that keeps its tables in object
//! storage.
//!
//! This crate drives the query lifecycle and the metadata operations built
//! on top of it. It includes:
//!
//! - **Execution**: submission, status polling and backoff-based waiting
//! - **Handles**: `Database` and `Table` for DDL, partitions and data
//! - **Modes**: standard execution or a sandbox isolating one test run
//! - **Collaborators**: `QueryEngine` / `ObjectStore` traits with in-memory
//!   implementations
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use quarry_client::{Client, MemoryEngine, MemoryObjectStore, QueryOptions};
//! use quarry_common::ClientConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> quarry_common::QuarryResult<()> {
//! let engine = MemoryEngine::shared();
//! let store = MemoryObjectStore::shared();
//! let client = Client::new(engine, store, ClientConfig::new())?;
//!
//! let execution = client
//!     .execute_query("SELECT 1", QueryOptions::sync())
//!     .await?;
//! assert!(execution.is_finished());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod client;
pub mod database;
pub mod downloader;
pub mod engine;
pub mod execution;
pub mod location;
pub mod mode;
pub mod poller;
pub mod table;
pub mod wiper;

pub use client::{Client, QueryOptions};
pub use database::Database;
pub use downloader::OutputDownloader;
pub use engine::{
    MemoryEngine, MemoryObjectStore, ObjectStore, QueryEngine, RawQueryStatus, StartQueryRequest,
    TransportError,
};
pub use execution::{QueryExecution, QueryState};
pub use location::OutputLocation;
pub use mode::{ExecutionMode, SandboxMode, StandardMode};
pub use poller::Backoff;
pub use table::Table;
pub use wiper::TableDataWiper;
