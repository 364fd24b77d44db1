//! Configuration for Quarry.
//!
//! This module provides the configuration consumed by the query client.

mod client;

pub use client::{BackoffConfig, ClientConfig, TypeFallback};
