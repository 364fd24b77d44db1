//! Sandboxed execution for tests against a real engine.

use std::sync::atomic::{AtomicBool, Ordering};

use quarry_common::{ClientConfig, QuarryError, QuarryResult};
use quarry_sql::ddl::{drop_database_sql, show_databases_sql};
use rand::RngCore;
use tracing::info;

use super::ExecutionMode;
use crate::client::{Client, QueryOptions};
use crate::location::OutputLocation;

/// Mode that isolates all data and databases of one run.
///
/// Paths move to `scheme://<bucket>/<test_id>/<orig bucket>/<orig key>`,
/// database names become `<test_id>_<name>` and every query runs
/// synchronously. The mode remembers whether it was used so `cleanup` only
/// talks to the engine when needed.
#[derive(Debug)]
pub struct SandboxMode {
    test_id: String,
    bucket: String,
    dirty: AtomicBool,
}

impl SandboxMode {
    /// Creates a sandbox with a random test id.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self::with_test_id(random_test_id(), bucket)
    }

    /// Creates a sandbox with the given test id.
    pub fn with_test_id(test_id: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            bucket: bucket.into(),
            dirty: AtomicBool::new(false),
        }
    }

    /// Creates a sandbox in the configured sandbox bucket.
    pub fn from_config(config: &ClientConfig) -> QuarryResult<Self> {
        let bucket = config
            .sandbox_bucket
            .as_deref()
            .ok_or_else(|| QuarryError::InvalidConfig {
                message: "sandbox_bucket is not configured".to_string(),
            })?;
        Ok(Self::new(bucket))
    }

    /// Identifier prefixed to every path and database name.
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Bucket receiving all sandboxed data.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns true if any name or path went through the sandbox.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Drops every database created under this sandbox.
    ///
    /// Does nothing unless the sandbox was used. Returns the dropped names.
    pub async fn cleanup(&self, client: &Client) -> QuarryResult<Vec<String>> {
        if !self.is_dirty() {
            return Ok(Vec::new());
        }

        let listing = client
            .execute_query(
                &show_databases_sql(&format!("{}.*", self.test_id)),
                QueryOptions::sync(),
            )
            .await?;
        let databases: Vec<String> = client
            .download(&listing)
            .await?
            .into_iter()
            .flatten()
            .collect();

        for database in &databases {
            info!(database = %database, "dropping sandbox database");
            client
                .execute_query(&drop_database_sql(database, true), QueryOptions::sync())
                .await?;
        }

        self.dirty.store(false, Ordering::Release);
        Ok(databases)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

impl ExecutionMode for SandboxMode {
    fn translate_path(&self, url: &str) -> QuarryResult<String> {
        self.mark_dirty();
        let location = OutputLocation::parse(url)?;
        Ok(format!(
            "{}://{}/{}/{}/{}",
            location.scheme(),
            self.bucket,
            self.test_id,
            location.bucket(),
            location.key()
        ))
    }

    fn translate_name(&self, name: &str) -> String {
        self.mark_dirty();
        format!("{}_{name}", self.test_id)
    }

    fn resolve_async(&self, _requested: bool) -> bool {
        self.mark_dirty();
        false
    }
}

fn random_test_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
