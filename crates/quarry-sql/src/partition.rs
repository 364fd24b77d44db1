//! Partition value sets and their expansion.
//!
//! A [`PartitionValueSet`] lists candidate values for each partition column.
//! Expanding it yields every combination in product order: keys keep their
//! insertion order and the last key varies fastest.

use quarry_common::{QuarryError, QuarryResult, Value};
use tracing::debug;

use crate::types::TypeRegistry;

/// Ordered mapping from partition name to candidate values.
///
/// # Example
///
/// ```rust
/// use quarry_sql::partition::PartitionValueSet;
///
/// let set = PartitionValueSet::new()
///     .with("country", ["us", "mx"])
///     .with("lang", [1, 2]);
///
/// assert_eq!(set.combination_count(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionValueSet {
    entries: Vec<(String, Vec<Value>)>,
}

impl PartitionValueSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds values for a partition, consuming and returning the set.
    #[must_use]
    pub fn with<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(name, values);
        self
    }

    /// Sets the values of a partition.
    ///
    /// A partition inserted twice keeps its original position and takes the
    /// new values.
    pub fn insert<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Returns the values of a partition.
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Partition names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates over `(name, values)` entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of partitions in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the set names no partition.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tuples the expansion yields.
    pub fn combination_count(&self) -> usize {
        if self.entries.is_empty() {
            return 0;
        }
        self.entries.iter().map(|(_, values)| values.len()).product()
    }

    /// Fails with `PartitionValue` when the set is empty or any partition
    /// has no values.
    pub fn validate(&self) -> QuarryResult<()> {
        if self.is_empty() {
            return Err(QuarryError::partition("partition value(s) missing"));
        }
        if let Some((name, _)) = self.entries.iter().find(|(_, values)| values.is_empty()) {
            return Err(QuarryError::partition(format!(
                "partition '{name}' has no values"
            )));
        }
        Ok(())
    }

    /// Builds a set holding only the named partitions, in the given order.
    pub fn restricted_to<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut restricted = Self::new();
        for name in names {
            if let Some(values) = self.get(name) {
                restricted.insert(name, values.iter().cloned());
            }
        }
        restricted
    }
}

/// One combination of partition values, aligned to the set's key order.
pub type PartitionTuple<'a> = Vec<(&'a str, &'a Value)>;

/// Expands a set into every combination of its values.
///
/// The result has exactly the product of the value list lengths, ordered
/// with the last partition varying fastest. An empty set expands to no
/// tuples. Repeated input values are not deduplicated.
pub fn cartesian_product(set: &PartitionValueSet) -> Vec<PartitionTuple<'_>> {
    if set.is_empty() {
        return Vec::new();
    }

    let mut tuples: Vec<PartitionTuple<'_>> = vec![Vec::with_capacity(set.len())];
    for (name, values) in set.iter() {
        let mut expanded = Vec::with_capacity(tuples.len() * values.len());
        for prefix in &tuples {
            for value in values {
                let mut tuple = prefix.clone();
                tuple.push((name, value));
                expanded.push(tuple);
            }
        }
        tuples = expanded;
    }
    tuples
}

/// Generates `ALTER TABLE ... ADD PARTITION` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionsGenerator;

impl PartitionsGenerator {
    /// Creates a generator.
    pub fn new() -> Self {
        Self
    }

    /// Renders one statement adding every combination of the set.
    ///
    /// Values are inlined as literals: integers bare, strings quoted.
    pub fn to_sql(
        &self,
        table: &str,
        set: &PartitionValueSet,
        permissive: bool,
    ) -> QuarryResult<String> {
        set.validate()?;

        let clauses = cartesian_product(set)
            .iter()
            .map(|tuple| partition_clause(tuple))
            .collect::<QuarryResult<Vec<_>>>()?;

        debug!(table, partitions = clauses.len(), "rendered partition statement");

        let guard = if permissive { " IF NOT EXISTS" } else { "" };
        Ok(format!(
            "ALTER TABLE {table} ADD{guard}\n{};",
            clauses.join("\n")
        ))
    }
}

fn partition_clause(tuple: &PartitionTuple<'_>) -> QuarryResult<String> {
    let assignments = tuple
        .iter()
        .map(|(name, value)| {
            let literal = TypeRegistry::serializer_for_value(value).literal(value)?;
            Ok(format!("{name} = {literal}"))
        })
        .collect::<QuarryResult<Vec<_>>>()?;
    Ok(format!("PARTITION ({})", assignments.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(tuples: &[PartitionTuple<'_>]) -> Vec<Vec<(String, String)>> {
        tuples
            .iter()
            .map(|tuple| {
                tuple
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), value.to_string()))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_product_order_last_key_fastest() {
        let set = PartitionValueSet::new()
            .with("country", ["us", "mx"])
            .with("lang", [1, 2]);

        let tuples = cartesian_product(&set);
        let rendered: Vec<Vec<String>> = pairs(&tuples)
            .into_iter()
            .map(|t| t.into_iter().map(|(_, v)| v).collect())
            .collect();

        assert_eq!(
            rendered,
            vec![
                vec!["us", "1"],
                vec!["us", "2"],
                vec!["mx", "1"],
                vec!["mx", "2"],
            ]
        );
        assert!(tuples
            .iter()
            .all(|t| t.iter().map(|(n, _)| *n).eq(["country", "lang"])));
    }

    #[test]
    fn test_product_size() {
        let set = PartitionValueSet::new()
            .with("a", [1, 2, 3])
            .with("b", ["x"])
            .with("c", [true, false]);

        let tuples = cartesian_product(&set);
        assert_eq!(tuples.len(), 6);
        assert_eq!(set.combination_count(), 6);

        let unique: std::collections::HashSet<_> = pairs(&tuples).into_iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_single_key() {
        let set = PartitionValueSet::new().with("dth", [2020, 2021]);
        assert_eq!(
            pairs(&cartesian_product(&set)),
            vec![
                vec![("dth".to_string(), "2020".to_string())],
                vec![("dth".to_string(), "2021".to_string())],
            ]
        );
    }

    #[test]
    fn test_duplicates_not_removed() {
        let set = PartitionValueSet::new().with("a", [1, 1]).with("b", [2]);
        assert_eq!(cartesian_product(&set).len(), 2);
    }

    #[test]
    fn test_empty_set_expands_to_nothing() {
        assert!(cartesian_product(&PartitionValueSet::new()).is_empty());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut set = PartitionValueSet::new().with("a", [1]).with("b", [2]);
        set.insert("a", [3, 4]);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.get("a"), Some(&[Value::Integer(3), Value::Integer(4)][..]));
    }

    #[test]
    fn test_validation() {
        let generator = PartitionsGenerator::new();

        let err = generator
            .to_sql("t", &PartitionValueSet::new(), true)
            .unwrap_err();
        assert!(matches!(err, QuarryError::PartitionValue { .. }));

        let set = PartitionValueSet::new()
            .with("a", [1])
            .with("b", Vec::<Value>::new());
        assert!(matches!(
            generator.to_sql("t", &set, true),
            Err(QuarryError::PartitionValue { .. })
        ));
    }

    #[test]
    fn test_to_sql() {
        let set = PartitionValueSet::new()
            .with("type", [1, 2])
            .with("country", ["us", "mx"]);

        let sql = PartitionsGenerator::new().to_sql("events", &set, false).unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE events ADD\n\
             PARTITION (type = 1, country = 'us')\n\
             PARTITION (type = 1, country = 'mx')\n\
             PARTITION (type = 2, country = 'us')\n\
             PARTITION (type = 2, country = 'mx');"
        );
    }

    #[test]
    fn test_to_sql_permissive_and_escaping() {
        let set = PartitionValueSet::new().with("owner", ["o'neil"]);
        let sql = PartitionsGenerator::new().to_sql("t", &set, true).unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE t ADD IF NOT EXISTS\nPARTITION (owner = 'o''neil');"
        );
    }
}
