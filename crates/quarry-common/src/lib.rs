//! # quarry-common
//!
//! Common types, errors, and configuration for Quarry.
//!
//! This crate provides the foundational types shared by the SQL generation
//! layer and the query client. It includes:
//!
//! - **Types**: the `Value` model decoded from query results and the
//!   `ColumnType` tokens used in table schemas
//! - **Errors**: unified error handling with `QuarryError`
//! - **Config**: client configuration loaded from TOML or built in code
//!
//! ## Example
//!
//! ```rust
//! use quarry_common::types::{ColumnType, Value};
//! use quarry_common::error::QuarryResult;
//!
//! fn example() -> QuarryResult<()> {
//!     let column_type: ColumnType = "bigint".parse()?;
//!     let value = Value::from(42);
//!     assert_eq!(column_type, ColumnType::BigInt);
//!     assert_eq!(value.as_i64(), Some(42));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use config::{BackoffConfig, ClientConfig, TypeFallback};
pub use error::{ErrorCode, QuarryError, QuarryResult};
pub use types::{ColumnType, Value};
