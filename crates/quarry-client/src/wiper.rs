//! Deletion of table data in object storage.

use quarry_common::{QuarryError, QuarryResult};
use quarry_sql::{cartesian_product, PartitionValueSet};
use tracing::info;

use crate::engine::ObjectStore;
use crate::location::OutputLocation;

/// Deletes a table's files, optionally limited to some partitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDataWiper;

impl TableDataWiper {
    /// Creates a wiper.
    pub fn new() -> Self {
        Self
    }

    /// Key prefixes to delete for the given partitions.
    ///
    /// Only the longest leading run of `partition_names` whose names match
    /// the keys of `partitions` in order is used. Each prefix ends with a
    /// slash so `country=us` never matches `country=usa` and a table never
    /// matches a sibling sharing its name as a prefix.
    pub fn prefixes(
        &self,
        location: &OutputLocation,
        partition_names: &[&str],
        partitions: Option<&PartitionValueSet>,
    ) -> QuarryResult<Vec<String>> {
        let base = location.key().trim_end_matches('/');
        let Some(partitions) = partitions else {
            return Ok(vec![format!("{base}/")]);
        };

        let leading: Vec<&str> = partition_names
            .iter()
            .zip(partitions.names())
            .take_while(|(declared, given)| *declared == given)
            .map(|(declared, _)| *declared)
            .collect();
        let matched = partitions.restricted_to(leading);

        if matched.is_empty() || matched.iter().any(|(_, values)| values.is_empty()) {
            return Err(QuarryError::partition(format!(
                "partitions [{}] do not match table partitions [{}]",
                partitions.names().collect::<Vec<_>>().join(", "),
                partition_names.join(", ")
            )));
        }

        Ok(cartesian_product(&matched)
            .into_iter()
            .map(|tuple| {
                let path = tuple
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join("/");
                format!("{base}/{path}/")
            })
            .collect())
    }

    /// Deletes the data and returns the deleted prefixes.
    pub async fn wipe(
        &self,
        store: &dyn ObjectStore,
        location: &OutputLocation,
        partition_names: &[&str],
        partitions: Option<&PartitionValueSet>,
    ) -> QuarryResult<Vec<String>> {
        let prefixes = self.prefixes(location, partition_names, partitions)?;
        for prefix in &prefixes {
            info!(bucket = location.bucket(), prefix = %prefix, "deleting table data");
            store
                .delete_prefix(location.bucket(), prefix)
                .await
                .map_err(|e| QuarryError::Storage {
                    message: format!("failed to delete {prefix}: {e}"),
                })?;
        }
        Ok(prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryObjectStore;

    fn location() -> OutputLocation {
        OutputLocation::parse("s3://data/tables/events/").unwrap()
    }

    #[test]
    fn test_whole_table() {
        let prefixes = TableDataWiper::new()
            .prefixes(&location(), &["country", "type"], None)
            .unwrap();
        assert_eq!(prefixes, vec!["tables/events/"]);
    }

    #[tokio::test]
    async fn test_whole_table_spares_siblings() {
        let store = MemoryObjectStore::new();
        store.put("data", "tables/events/a.tsv", "1");
        store.put("data", "tables/events_archive/b.tsv", "2");
        let location = OutputLocation::parse("s3://data/tables/events").unwrap();

        let deleted = TableDataWiper::new()
            .wipe(&store, &location, &["country"], None)
            .await
            .unwrap();

        assert_eq!(deleted, vec!["tables/events/"]);
        assert_eq!(store.keys("data"), vec!["tables/events_archive/b.tsv"]);
    }

    #[test]
    fn test_full_partition_match() {
        let set = PartitionValueSet::new()
            .with("country", ["us", "mx"])
            .with("type", [1]);
        let prefixes = TableDataWiper::new()
            .prefixes(&location(), &["country", "type"], Some(&set))
            .unwrap();
        assert_eq!(
            prefixes,
            vec![
                "tables/events/country=us/type=1/",
                "tables/events/country=mx/type=1/",
            ]
        );
    }

    #[test]
    fn test_leading_run_only() {
        let set = PartitionValueSet::new()
            .with("country", ["us"])
            .with("lang", ["en"]);
        let prefixes = TableDataWiper::new()
            .prefixes(&location(), &["country", "type"], Some(&set))
            .unwrap();
        assert_eq!(prefixes, vec!["tables/events/country=us/"]);
    }

    #[test]
    fn test_mismatched_partitions() {
        let wiper = TableDataWiper::new();

        let set = PartitionValueSet::new().with("type", [1]);
        assert!(matches!(
            wiper.prefixes(&location(), &["country", "type"], Some(&set)),
            Err(QuarryError::PartitionValue { .. })
        ));

        let empty_values = PartitionValueSet::new().with("country", Vec::<&str>::new());
        assert!(matches!(
            wiper.prefixes(&location(), &["country"], Some(&empty_values)),
            Err(QuarryError::PartitionValue { .. })
        ));

        assert!(matches!(
            wiper.prefixes(&location(), &["country"], Some(&PartitionValueSet::new())),
            Err(QuarryError::PartitionValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_wipe_deletes_from_store() {
        let store = MemoryObjectStore::new();
        store.put("data", "tables/events/country=us/type=1/a.tsv", "1");
        store.put("data", "tables/events/country=usa/type=1/b.tsv", "2");
        store.put("data", "tables/events/country=mx/type=1/c.tsv", "3");

        let set = PartitionValueSet::new().with("country", ["us", "mx"]);
        TableDataWiper::new()
            .wipe(&store, &location(), &["country", "type"], Some(&set))
            .await
            .unwrap();

        assert_eq!(
            store.keys("data"),
            vec!["tables/events/country=usa/type=1/b.tsv"]
        );
    }
}
