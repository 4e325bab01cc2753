use crate::error::{IngestError, Result};
use crate::grid::{CellValue, RawGrid, Row, grid_from_range};
use calamine::{Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

/// Container formats accepted for upload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// xlsx, xlsm, xlsb, xls or ods; the exact flavour is sniffed from content
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Pick a format from a file name. Anything that is not `.csv` is
    /// treated as a workbook and left to calamine to accept or reject.
    pub fn from_file_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("csv") => SourceFormat::Csv,
            _ => SourceFormat::Workbook,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Workbook => "xlsx",
            SourceFormat::Csv => "csv",
        }
    }

    pub fn is_supported_extension(ext: &str) -> bool {
        matches!(
            ext.to_lowercase().as_str(),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "csv"
        )
    }
}

/// A grid together with the sheet it came from
#[derive(Clone, Debug, Default)]
pub struct WorkbookGrid {
    pub sheet_names: Vec<String>,
    pub sheet: String,
    pub grid: RawGrid,
}

/// Read the first sheet of an uploaded file into a grid
pub fn load_grid(bytes: &[u8], format: SourceFormat) -> Result<WorkbookGrid> {
    match format {
        SourceFormat::Workbook => {
            let mut sheets = load_all_sheets(bytes)?;
            if sheets.is_empty() {
                return Err(IngestError::UnreadableSpreadsheet(
                    "no sheets found in workbook".to_string(),
                ));
            }
            Ok(sheets.remove(0))
        }
        SourceFormat::Csv => from_csv(bytes),
    }
}

/// Read every sheet of a workbook, in workbook order
pub fn load_all_sheets(bytes: &[u8]) -> Result<Vec<WorkbookGrid>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_names = workbook.sheet_names();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let range = workbook.worksheet_range(name)?;
        sheets.push(WorkbookGrid {
            sheet_names: sheet_names.clone(),
            sheet: name.clone(),
            grid: grid_from_range(&range),
        });
    }

    Ok(sheets)
}

/// Parse CSV bytes. Rows may have different widths; the first line is data
/// like any other, header detection happens later.
pub fn from_csv(bytes: &[u8]) -> Result<WorkbookGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = RawGrid::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Row = record.iter().map(CellValue::from).collect();
        while row.last().is_some_and(CellValue::is_blank) {
            row.pop();
        }
        grid.push(row);
    }

    Ok(WorkbookGrid {
        sheet_names: vec!["csv".to_string()],
        sheet: "csv".to_string(),
        grid,
    })
}

/// Load a file from disk, picking the format from its name
pub fn load_grid_from_path(path: impl AsRef<Path>) -> Result<WorkbookGrid> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    load_grid(&bytes, SourceFormat::from_file_name(name))
}
