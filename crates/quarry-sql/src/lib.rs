//! # quarry-sql
//!
//! SQL generation and type serialization for Quarry.
//!
//! This crate turns table descriptions into engine statements and converts
//! values between their typed, literal and wire forms:
//!
//! - [`types`]: the serializer registry and the null-aware combinator
//! - [`schema`]: ordered column and partition definitions
//! - [`format`]: row format presets and custom serde clauses
//! - [`ddl`]: `CREATE EXTERNAL TABLE` and database statements
//! - [`partition`]: partition value expansion and `ADD PARTITION` rendering
//! - [`insert`]: bulk `INSERT` rendering
//! - [`output`]: decoding of result grids

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod ddl;
pub mod format;
pub mod insert;
pub mod output;
pub mod partition;
pub mod schema;
pub mod types;

pub use ddl::TableDdlGenerator;
pub use format::{FormatDescriptor, FormatPreset, SerdeFormat};
pub use insert::{InsertGenerator, Row};
pub use output::OutputParser;
pub use partition::{cartesian_product, PartitionValueSet, PartitionsGenerator};
pub use schema::{Column, TableSchema, TableSchemaBuilder};
pub use types::{Serializer, TypeRegistry};
