//! Type definitions for Quarry.
//!
//! This module contains the value model exchanged with the query engine and
//! the column type tokens used by table schemas.

mod column;
mod value;

pub use column::ColumnType;
pub use value::{Value, TIMESTAMP_FORMAT};
