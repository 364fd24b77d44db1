//! End-to-end query lifecycle against the in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quarry_client::{
    Backoff, Client, MemoryEngine, MemoryObjectStore, QueryOptions, QueryState, SandboxMode,
};
use quarry_common::{ClientConfig, ColumnType, QuarryError, Value};
use quarry_sql::{PartitionValueSet, TableSchema};

struct Harness {
    engine: Arc<MemoryEngine>,
    store: Arc<MemoryObjectStore>,
    client: Client,
}

fn harness(config: ClientConfig) -> Harness {
    let store = MemoryObjectStore::shared();
    let engine = Arc::new(MemoryEngine::with_store(Arc::clone(&store)));
    let client = Client::new(engine.clone(), store.clone(), config)
        .unwrap()
        .with_backoff(Backoff::immediate());
    Harness {
        engine,
        store,
        client,
    }
}

fn default_harness() -> Harness {
    harness(ClientConfig::new().output_location("s3://results/out"))
}

#[tokio::test]
async fn test_sync_query_polls_until_finished() {
    let h = default_harness();
    h.engine.script_states(&["QUEUED", "RUNNING", "SUCCEEDED"]);

    let execution = h
        .client
        .execute_query("SELECT 1", QueryOptions::sync())
        .await
        .unwrap();

    assert_eq!(execution.state(), QueryState::Finished);
    assert_eq!(h.engine.polls(execution.id()), 3);
    assert_eq!(
        execution.output_location().unwrap().url(),
        "s3://results/out/query-1.csv"
    );
}

#[tokio::test]
async fn test_backoff_sleeps_before_every_poll() {
    let h = default_harness();
    h.engine.script_states(&["RUNNING", "RUNNING", "SUCCEEDED"]);

    let attempts = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&attempts);
    let client = h.client.clone().with_backoff(Backoff::custom(move |attempt| {
        recorder.lock().push(attempt);
        Duration::from_millis(1)
    }));

    client
        .execute_query("SELECT 1", QueryOptions::sync())
        .await
        .unwrap();
    assert_eq!(*attempts.lock(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_failed_query_raises_reason() {
    let h = default_harness();
    h.engine.script([quarry_client::RawQueryStatus::new("FAILED")
        .with_reason("SYNTAX_ERROR: line 1:8: Column 'x' cannot be resolved")]);

    let err = h
        .client
        .execute_query("SELECT x", QueryOptions::sync())
        .await
        .unwrap_err();

    assert!(matches!(err, QuarryError::QueryExecution { .. }));
    assert_eq!(
        err.to_string(),
        "SYNTAX_ERROR: line 1:8: Column 'x' cannot be resolved"
    );
}

#[tokio::test]
async fn test_unknown_state_is_unsupported() {
    let h = default_harness();
    h.engine.script_states(&["PAUSED"]);

    let err = h
        .client
        .execute_query("SELECT 1", QueryOptions::sync())
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::UnsupportedStatus { status } if status == "PAUSED"));
}

#[tokio::test]
async fn test_submission_failure() {
    let h = default_harness();
    h.engine.fail_submissions("too many requests");

    let err = h
        .client
        .execute_query("SELECT 1", QueryOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, QuarryError::Submission { .. }));
    assert!(err.to_string().contains("too many requests"));
}

#[tokio::test]
async fn test_fetch_result_decodes_types() {
    let h = default_harness();
    h.engine.respond_with(
        "MAX(time)",
        "\"_col0\",\"_col1\"\n\"2020-05-04 11:19:03.000\",\"7\"\n",
    );

    let execution = h
        .client
        .execute_query("SELECT MAX(time), MIN(id) FROM events;", QueryOptions::sync())
        .await
        .unwrap();
    let rows = h
        .client
        .fetch_result(&execution, &[ColumnType::Timestamp, ColumnType::Int])
        .await
        .unwrap();

    let expected = chrono::NaiveDate::from_ymd_opt(2020, 5, 4)
        .unwrap()
        .and_hms_opt(11, 19, 3)
        .unwrap();
    assert_eq!(rows, vec![vec![Value::Timestamp(expected), Value::Integer(7)]]);
}

#[tokio::test]
async fn test_table_round_trip() {
    let h = default_harness();
    let schema = TableSchema::builder()
        .column("message", ColumnType::String)
        .partition("country", ColumnType::String)
        .partition("type", ColumnType::Int)
        .build()
        .unwrap();
    let database = h.client.database("analytics");
    let table = database.table("events", schema, "s3://data/events");

    database.create().await.unwrap();
    table.create().await.unwrap();
    table
        .add_partitions(
            &PartitionValueSet::new()
                .with("country", ["us", "mx"])
                .with("type", [1, 2]),
        )
        .await
        .unwrap();

    let queries = h.engine.queries();
    assert_eq!(queries[0], "CREATE DATABASE IF NOT EXISTS analytics;");
    assert!(queries[1].starts_with("CREATE EXTERNAL TABLE IF NOT EXISTS events ("));
    assert!(queries[1].contains("PARTITIONED BY (\n  `country` string,\n  `type` int\n)"));
    assert_eq!(
        queries[2],
        "ALTER TABLE events ADD IF NOT EXISTS\n\
         PARTITION (country = 'us', type = 1)\n\
         PARTITION (country = 'us', type = 2)\n\
         PARTITION (country = 'mx', type = 1)\n\
         PARTITION (country = 'mx', type = 2);"
    );
}

#[tokio::test]
async fn test_sandbox_isolates_and_cleans_up() {
    let h = harness(
        ClientConfig::new()
            .output_location("s3://results/out")
            .sandbox_bucket("sandbox"),
    );
    let sandbox = Arc::new(SandboxMode::with_test_id("t1", "sandbox"));
    let client = h.client.clone().with_mode(sandbox.clone());

    let schema = TableSchema::builder()
        .column("id", ColumnType::Int)
        .partition("dth", ColumnType::Int)
        .build()
        .unwrap();
    let database = client.database("analytics");
    let table = database.table("events", schema, "s3://data/events/");

    // Asynchronous requests are forced to wait.
    h.engine.script_states(&["RUNNING", "SUCCEEDED"]);
    let execution = database
        .execute_query("SELECT 1", QueryOptions::new())
        .await
        .unwrap();
    assert!(execution.is_finished());

    table.create().await.unwrap();
    assert_eq!(table.location().unwrap(), "s3://sandbox/t1/data/events/");

    let submitted = h.engine.submitted();
    assert_eq!(submitted[0].database.as_deref(), Some("t1_analytics"));
    assert_eq!(
        submitted[0].output_location.as_deref(),
        Some("s3://sandbox/t1/results/out")
    );
    assert!(submitted[1].query.contains("LOCATION 's3://sandbox/t1/data/events/';"));

    h.store.put("sandbox", "t1/data/events/dth=1/part-0", "1");
    h.store.put("data", "events/dth=1/part-0", "untouched");
    let set = PartitionValueSet::new().with("dth", [1]);
    assert_eq!(
        table.wipe_data(Some(&set)).await.unwrap(),
        vec!["t1/data/events/dth=1/"]
    );
    assert!(h.store.keys("sandbox").iter().all(|key| !key.contains("part-0")));
    assert!(h.store.contains("data", "events/dth=1/part-0"));

    h.engine
        .respond_with("SHOW DATABASES LIKE 't1.*'", "t1_analytics\nt1_scratch\n");
    let dropped = sandbox.cleanup(&client).await.unwrap();
    assert_eq!(dropped, vec!["t1_analytics", "t1_scratch"]);

    let queries = h.engine.queries();
    let tail = &queries[queries.len() - 3..];
    assert_eq!(
        tail,
        [
            "SHOW DATABASES LIKE 't1.*';",
            "DROP DATABASE IF EXISTS t1_analytics CASCADE;",
            "DROP DATABASE IF EXISTS t1_scratch CASCADE;",
        ]
    );
    assert!(!sandbox.is_dirty());
    assert!(sandbox.cleanup(&client).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_database_exists_via_listing() {
    let h = default_harness();
    h.engine.respond_with("SHOW DATABASES", "analytics\nanalytics_v2\n");

    assert!(h.client.database("analytics").exists().await.unwrap());
    assert!(!h.client.database("analytic").exists().await.unwrap());
}
