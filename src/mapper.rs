use crate::grid::{CellValue, Row};
use crate::record::{Record, RecordSet};

/// Trimmed header names paired with their column index. Blank headers are dropped.
pub fn header_columns(header: &Row) -> Vec<(usize, String)> {
    header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let name = cell.to_text().trim().to_string();
            (!name.is_empty()).then_some((i, name))
        })
        .collect()
}

/// A data row produces a record only if its first cell has visible text
pub fn is_eligible(row: &Row) -> bool {
    row.first().is_some_and(|cell| !cell.is_blank())
}

/// Map the rows below the header into records.
///
/// Ids count eligible rows only, starting at 1. Cells past the end of a short
/// row come out as empty strings.
pub fn map_records(header: &Row, rows: &[Row]) -> RecordSet {
    let columns = header_columns(header);

    let records = rows
        .iter()
        .filter(|row| is_eligible(row))
        .enumerate()
        .map(|(position, row)| {
            let mut record = Record::new(position + 1);
            for (i, name) in &columns {
                let value = row.get(*i).map(CellValue::to_text).unwrap_or_default();
                record.set(name.as_str(), value.trim());
            }
            record
        })
        .collect();

    let mut names: Vec<String> = Vec::with_capacity(columns.len());
    for (_, name) in columns {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    RecordSet::new(names, records)
}
