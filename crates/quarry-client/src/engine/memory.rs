//! In-memory collaborators for testing.
//!
//! `MemoryEngine` replays scripted status sequences instead of running SQL,
//! and `MemoryObjectStore` keeps objects in a map. Both record what they
//! were asked to do so tests can assert on it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use super::{
    BoxFuture, ObjectStore, QueryEngine, RawQueryStatus, StartQueryRequest, TransportError,
    TransportResult,
};

/// State token of a successful execution.
const SUCCEEDED: &str = "SUCCEEDED";

/// Execution tracked by the memory engine.
#[derive(Debug)]
struct ExecutionRecord {
    /// Statuses still to report; the last one repeats.
    statuses: VecDeque<RawQueryStatus>,
    /// Number of status requests served.
    polls: usize,
}

/// Canned result written to the store when a matching query is submitted.
#[derive(Debug, Clone)]
struct CannedResult {
    pattern: String,
    body: Bytes,
}

/// In-memory query engine.
///
/// Every submitted query takes the next scripted status sequence, or a
/// single `SUCCEEDED` status when nothing is scripted. A status request
/// consumes one entry of the sequence, and the final entry is reported
/// forever.
///
/// A successful status without an output location reports
/// `<request output location>/<id>.csv`.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    next_id: AtomicU64,
    scripts: Mutex<VecDeque<Vec<RawQueryStatus>>>,
    executions: DashMap<String, ExecutionRecord>,
    submitted: Mutex<Vec<StartQueryRequest>>,
    submission_failure: RwLock<Option<String>>,
    results: RwLock<Vec<CannedResult>>,
    store: Option<Arc<MemoryObjectStore>>,
}

impl MemoryEngine {
    /// Creates an engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that writes canned results into `store`.
    pub fn with_store(store: Arc<MemoryObjectStore>) -> Self {
        Self {
            store: Some(store),
            ..Self::default()
        }
    }

    /// Creates an engine wrapped in Arc.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queues a status sequence for the next submitted query.
    pub fn script<I>(&self, statuses: I)
    where
        I: IntoIterator<Item = RawQueryStatus>,
    {
        self.scripts.lock().push_back(statuses.into_iter().collect());
    }

    /// Queues a sequence of bare state tokens for the next submitted query.
    pub fn script_states(&self, states: &[&str]) {
        self.script(states.iter().map(|state| RawQueryStatus::new(*state)));
    }

    /// Makes every following submission fail with `reason`.
    pub fn fail_submissions(&self, reason: impl Into<String>) {
        *self.submission_failure.write() = Some(reason.into());
    }

    /// Registers a CSV body written as the result of queries containing
    /// `pattern`.
    pub fn respond_with(&self, pattern: impl Into<String>, body: impl Into<Bytes>) {
        self.results.write().push(CannedResult {
            pattern: pattern.into(),
            body: body.into(),
        });
    }

    /// Requests submitted so far, in order.
    pub fn submitted(&self) -> Vec<StartQueryRequest> {
        self.submitted.lock().clone()
    }

    /// SQL text of the submitted queries, in order.
    pub fn queries(&self) -> Vec<String> {
        self.submitted
            .lock()
            .iter()
            .map(|request| request.query.clone())
            .collect()
    }

    /// Number of status requests served for an execution.
    pub fn polls(&self, id: &str) -> usize {
        self.executions.get(id).map_or(0, |record| record.polls)
    }

    fn start(&self, request: StartQueryRequest) -> TransportResult<String> {
        if let Some(reason) = self.submission_failure.read().clone() {
            return Err(TransportError::Rejected(reason));
        }

        let id = format!("query-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let output = request
            .output_location
            .as_deref()
            .map(|location| format!("{}/{id}.csv", location.trim_end_matches('/')));

        let statuses = self
            .scripts
            .lock()
            .pop_front()
            .filter(|statuses| !statuses.is_empty())
            .unwrap_or_else(|| vec![RawQueryStatus::new(SUCCEEDED)]);
        let statuses = statuses
            .into_iter()
            .map(|mut status| {
                if status.state == SUCCEEDED && status.output_location.is_none() {
                    status.output_location.clone_from(&output);
                }
                status
            })
            .collect();

        if let (Some(store), Some(url)) = (&self.store, &output) {
            let canned = self
                .results
                .read()
                .iter()
                .find(|canned| request.query.contains(&canned.pattern))
                .map(|canned| canned.body.clone());
            if let Some(body) = canned {
                store.put_url(url, body)?;
            }
        }

        self.executions
            .insert(id.clone(), ExecutionRecord { statuses, polls: 0 });
        self.submitted.lock().push(request);
        Ok(id)
    }

    fn status(&self, id: &str) -> TransportResult<RawQueryStatus> {
        let mut record = self
            .executions
            .get_mut(id)
            .ok_or_else(|| TransportError::NotFound(format!("query execution {id}")))?;

        record.polls += 1;
        let status = if record.statuses.len() > 1 {
            record.statuses.pop_front()
        } else {
            record.statuses.front().cloned()
        };
        status.ok_or_else(|| TransportError::NotFound(format!("status of {id}")))
    }
}

impl QueryEngine for MemoryEngine {
    fn start_query(&self, request: StartQueryRequest) -> BoxFuture<'_, TransportResult<String>> {
        Box::pin(async move { self.start(request) })
    }

    fn query_status<'a>(&'a self, id: &'a str) -> BoxFuture<'a, TransportResult<RawQueryStatus>> {
        Box::pin(async move { self.status(id) })
    }
}

/// In-memory object store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: DashMap<(String, String), Bytes>,
    deleted_prefixes: Mutex<Vec<(String, String)>>,
}

impl MemoryObjectStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store wrapped in Arc.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Stores an object.
    pub fn put(&self, bucket: impl Into<String>, key: impl Into<String>, body: impl Into<Bytes>) {
        self.objects.insert((bucket.into(), key.into()), body.into());
    }

    /// Stores an object addressed by a `scheme://bucket/key` URI.
    pub fn put_url(&self, url: &str, body: impl Into<Bytes>) -> TransportResult<()> {
        let (bucket, key) = url
            .split_once("://")
            .and_then(|(_, rest)| rest.split_once('/'))
            .ok_or_else(|| TransportError::Rejected(format!("bad object url {url}")))?;
        self.put(bucket, key, body);
        Ok(())
    }

    /// Returns true if the object exists.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Keys stored in a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// `(bucket, prefix)` pairs passed to `delete_prefix`, in order.
    pub fn deleted_prefixes(&self) -> Vec<(String, String)> {
        self.deleted_prefixes.lock().clone()
    }

    fn get(&self, bucket: &str, key: &str) -> TransportResult<Bytes> {
        self.objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| TransportError::NotFound(format!("{bucket}/{key}")))
    }

    fn delete(&self, bucket: &str, prefix: &str) {
        self.objects
            .retain(|(object_bucket, key), _| !(object_bucket == bucket && key.starts_with(prefix)));
        self.deleted_prefixes
            .lock()
            .push((bucket.to_string(), prefix.to_string()));
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> BoxFuture<'a, TransportResult<Bytes>> {
        Box::pin(async move { self.get(bucket, key) })
    }

    fn delete_prefix<'a>(&'a self, bucket: &'a str, prefix: &'a str) -> BoxFuture<'a, TransportResult<()>> {
        Box::pin(async move {
            self.delete(bucket, prefix);
            Ok(())
        })
    }
}
