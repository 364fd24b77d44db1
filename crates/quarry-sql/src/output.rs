//! Decoding of query result grids into typed values.

use quarry_common::{ColumnType, QuarryResult, Value};
use tracing::debug;

use crate::types::{DefaultSerializer, TypeRegistry, TypeSerializer};

/// Decodes the text grid of a result file.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputParser {
    registry: TypeRegistry,
}

impl OutputParser {
    /// Creates a parser using the given registry.
    pub fn new(registry: TypeRegistry) -> Self {
        Self { registry }
    }

    /// Drops the header row and decodes the rest positionally.
    ///
    /// Cells past the supplied types are kept as strings.
    pub fn parse(
        &self,
        rows: &[Vec<String>],
        types: &[ColumnType],
    ) -> QuarryResult<Vec<Vec<Value>>> {
        let serializers = types
            .iter()
            .map(|column_type| self.registry.serializer_for(column_type))
            .collect::<QuarryResult<Vec<_>>>()?;

        let decoded = rows
            .iter()
            .skip(1)
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(index, cell)| match serializers.get(index) {
                        Some(serializer) => serializer.load(Some(cell.as_str())),
                        None => DefaultSerializer.load(cell),
                    })
                    .collect::<QuarryResult<Vec<_>>>()
            })
            .collect::<QuarryResult<Vec<_>>>()?;

        debug!(rows = decoded.len(), columns = types.len(), "parsed query output");
        Ok(decoded)
    }
}
