use crate::error::{IngestError, Result};
use crate::header::{DEFAULT_SCAN_ROWS, HeaderPolicy, locate_header};
use crate::loader::{SourceFormat, WorkbookGrid, load_grid};
use crate::mapper::map_records;
use crate::record::RecordSet;
use log::{debug, info, warn};

/// Knobs for one ingestion run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IngestOptions {
    pub header_policy: HeaderPolicy,
    pub header_scan_rows: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            header_policy: HeaderPolicy::default(),
            header_scan_rows: DEFAULT_SCAN_ROWS,
        }
    }
}

/// Result of a successful run
#[derive(Clone, Debug)]
pub struct Ingested {
    pub records: RecordSet,
    pub header_row: usize,
    pub sheet: String,
}

/// Locate the header and map everything below it
pub fn ingest_grid(loaded: &WorkbookGrid, options: &IngestOptions) -> Result<Ingested> {
    let grid = &loaded.grid;
    debug!("sheet '{}' has {} rows", loaded.sheet, grid.len());

    let header_row = locate_header(grid, options.header_scan_rows, options.header_policy)
        .ok_or_else(|| {
            let scanned = options.header_scan_rows.min(grid.len());
            warn!(
                "no header row ({} policy) in the first {} rows of '{}'",
                options.header_policy, scanned, loaded.sheet
            );
            IngestError::HeaderNotFound { scanned }
        })?;

    info!(
        "found headers in row {} of '{}': {:?}",
        header_row + 1,
        loaded.sheet,
        grid[header_row].iter().map(|c| c.to_text()).collect::<Vec<_>>()
    );

    let records = map_records(&grid[header_row], &grid[header_row + 1..]);
    info!(
        "loaded {} exercises with {} columns",
        records.len(),
        records.columns.len()
    );

    Ok(Ingested {
        records,
        header_row,
        sheet: loaded.sheet.clone(),
    })
}

/// Whole pipeline: bytes to a finished record set. Nothing is published here;
/// the caller swaps the result in only on `Ok`.
pub fn ingest(bytes: &[u8], format: SourceFormat, options: &IngestOptions) -> Result<Ingested> {
    let loaded = load_grid(bytes, format)?;
    info!(
        "using sheet '{}' (available: {:?})",
        loaded.sheet, loaded.sheet_names
    );
    ingest_grid(&loaded, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_with_cover_rows() {
        let csv = b"Strength Library v2\nUse the filters to narrow results\n\nExercise,Difficulty Level,Primary Equipment\nPush-up,Beginner,Bodyweight\n,,\nBench Press,Intermediate,Barbell\n";
        let result = ingest(csv, SourceFormat::Csv, &IngestOptions::default()).unwrap();

        // blank CSV lines are dropped by the reader, so the header is the third row
        assert_eq!(result.header_row, 2);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records.records[1].id, 2);
        assert_eq!(result.records.records[1].get("Exercise"), Some("Bench Press"));
    }

    #[test]
    fn missing_header_is_reported() {
        let csv = b"a,b,c\n1,2,3\n";
        let err = ingest(csv, SourceFormat::Csv, &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::HeaderNotFound { scanned: 2 }));

        let generic = IngestOptions {
            header_policy: HeaderPolicy::MinCells(3),
            ..IngestOptions::default()
        };
        let result = ingest(csv, SourceFormat::Csv, &generic).unwrap();
        assert_eq!(result.header_row, 0);
        assert_eq!(result.records.records[0].get("a"), Some("1"));
    }

    #[test]
    fn unreadable_bytes_fail_early() {
        let err = ingest(b"\x00\x01\x02", SourceFormat::Workbook, &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::UnreadableSpreadsheet(_)));
    }
}
