//! Execution modes.
//!
//! A mode decides how storage paths and database names are rewritten and
//! whether queries may run asynchronously. The client consults its mode at
//! every call site.
//!
//! - `StandardMode`: no rewriting
//! - `SandboxMode`: isolates everything under a per-run test id

mod sandbox;

pub use sandbox::SandboxMode;

use std::fmt::Debug;

use quarry_common::QuarryResult;

/// Strategy for rewriting names and paths.
pub trait ExecutionMode: Send + Sync + Debug {
    /// Rewrites a `scheme://bucket/key` storage URI.
    fn translate_path(&self, url: &str) -> QuarryResult<String>;

    /// Rewrites a database name.
    fn translate_name(&self, name: &str) -> String;

    /// Decides whether a query requested as `requested` runs asynchronously.
    fn resolve_async(&self, requested: bool) -> bool;
}

/// Identity mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMode;

impl ExecutionMode for StandardMode {
    fn translate_path(&self, url: &str) -> QuarryResult<String> {
        Ok(url.to_string())
    }

    fn translate_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn resolve_async(&self, requested: bool) -> bool {
        requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_mode_is_identity() {
        let mode = StandardMode;
        assert_eq!(mode.translate_path("not even a url").unwrap(), "not even a url");
        assert_eq!(mode.translate_name("logs"), "logs");
        assert!(mode.resolve_async(true));
        assert!(!mode.resolve_async(false));
    }
}
