use serde::{Serialize, Serializer};
use std::fmt;

/// A single cell as read from the source sheet
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

/// One row of cells. Rows have no fixed width; a blank row is an empty `Vec`.
pub type Row = Vec<CellValue>;

/// The whole sheet, top to bottom
pub type RawGrid = Vec<Row>;

impl CellValue {
    /// Stringify the cell the way a spreadsheet would print it.
    ///
    /// Whole floats drop their fraction (`12.0` becomes `"12"`), which keeps
    /// numeric ids and reps counts readable as text.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// True when the stringified, trimmed value has no characters
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&calamine::Data> for CellValue {
    fn from(cell: &calamine::Data) -> Self {
        use calamine::Data;

        match cell {
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(x) => CellValue::Float(*x),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Empty => CellValue::Empty,
            // Dates, durations and error cells keep their displayed form
            other => CellValue::Text(other.to_string()),
        }
    }
}

// The debug preview ships raw rows to the browser as plain JSON scalars.
impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(x) => serializer.serialize_f64(*x),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

/// Convert a calamine range into a grid, one `Row` per sheet row.
///
/// Trailing empty cells are trimmed from each row so a blank line in the
/// sheet becomes an empty row rather than a row of `Empty` cells.
pub fn grid_from_range(range: &calamine::Range<calamine::Data>) -> RawGrid {
    range
        .rows()
        .map(|row| {
            let mut cells: Row = row.iter().map(CellValue::from).collect();
            while matches!(cells.last(), Some(CellValue::Empty)) {
                cells.pop();
            }
            cells
        })
        .collect()
}

/// Build a grid from string literals. Handy for tests and the inspector.
pub fn grid_from_strs(rows: &[&[&str]]) -> RawGrid {
    rows.iter()
        .map(|row| row.iter().map(|s| CellValue::from(*s)).collect())
        .collect()
}
