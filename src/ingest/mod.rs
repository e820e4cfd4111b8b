pub mod categories;
pub mod hours;
pub mod record;

use crate::error::Result;
use crate::ingest::record::{parse_row, ColumnMap};
use crate::storage::Storage;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Outcome of one batch load. Row-level failures end up here instead of
/// aborting the batch; contract failures never produce a summary at all.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub businesses_loaded: usize,
    pub rows_skipped: usize,
    pub field_warnings: usize,
    pub skipped: Vec<String>,
}

/// Runs the one-shot batch load: CSV → parse/normalize → atomic replace.
///
/// A missing required column fails before any row is parsed. Malformed rows
/// are skipped, logged, and counted; the surviving rows are handed to the
/// store as a single batch.
pub async fn load_csv<P: AsRef<Path>>(csv_path: P, storage: &dyn Storage) -> Result<LoadSummary> {
    let path = csv_path.as_ref();
    info!("Reading CSV file {}", path.display());

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let map = ColumnMap::from_headers(reader.headers()?)?;

    let mut summary = LoadSummary::default();
    let mut records = Vec::new();

    for (index, row_result) in reader.records().enumerate() {
        // Row numbers are 1-based and count the header line.
        let row = index + 2;
        summary.rows_read += 1;

        let csv_record = match row_result {
            Ok(record) => record,
            Err(e) => {
                warn!("Row {}: unreadable CSV record: {}", row, e);
                summary.rows_skipped += 1;
                summary.skipped.push(format!("row {}: {}", row, e));
                continue;
            }
        };

        match parse_row(&map, &csv_record, row) {
            Ok(parsed) => {
                for warning in &parsed.warnings {
                    warn!("Row {} (business {}): {}", row, parsed.record.business.id, warning);
                }
                summary.field_warnings += parsed.warnings.len();
                records.push(parsed.record);
            }
            Err(e) => {
                warn!("Skipping row: {}", e);
                summary.rows_skipped += 1;
                summary.skipped.push(e.to_string());
            }
        }
    }

    summary.businesses_loaded = storage.replace_batch(&records).await?;
    info!(
        "Batch load finished: {} loaded, {} skipped, {} field warnings",
        summary.businesses_loaded, summary.rows_skipped, summary.field_warnings
    );
    Ok(summary)
}
