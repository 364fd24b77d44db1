//! Result file download.

use quarry_common::{QuarryError, QuarryResult};
use tracing::debug;

use crate::engine::ObjectStore;
use crate::location::OutputLocation;

/// Fetches result files and splits them into a grid of strings.
///
/// Result files are RFC 4180 CSV. The header row is kept; the output
/// parser drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputDownloader;

impl OutputDownloader {
    /// Creates a downloader.
    pub fn new() -> Self {
        Self
    }

    /// Reads the object at `location` and parses it.
    pub async fn download(
        &self,
        store: &dyn ObjectStore,
        location: &OutputLocation,
    ) -> QuarryResult<Vec<Vec<String>>> {
        let body = store
            .get_object(location.bucket(), location.key())
            .await
            .map_err(|e| QuarryError::Storage {
                message: format!("failed to read {location}: {e}"),
            })?;

        let grid = parse_csv(&body)?;
        debug!(location = %location, rows = grid.len(), "downloaded query output");
        Ok(grid)
    }
}

/// Splits a CSV body into rows of cells.
pub fn parse_csv(body: &[u8]) -> QuarryResult<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body);

    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(|e| QuarryError::OutputFormat {
                    message: e.to_string(),
                })
        })
        .collect()
}
