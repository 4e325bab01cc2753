//! Header row detection
//!
//! Exercise sheets usually open with a cover page or a block of usage notes,
//! so the column names are rarely on the first row. The locator walks the
//! first few rows and stops at the first one that looks like a header.

use crate::grid::{RawGrid, Row};
use std::fmt;
use std::str::FromStr;

/// How many rows are scanned before giving up
pub const DEFAULT_SCAN_ROWS: usize = 20;

/// Minimum populated cells for [`HeaderPolicy::MinCells`]
pub const DEFAULT_MIN_CELLS: usize = 3;

/// Lower-case fragments that mark a header cell
pub const HEADER_KEYWORDS: [&str; 6] = [
    "exercise",
    "name",
    "difficulty",
    "muscle",
    "equipment",
    "video",
];

/// Rule used to accept a candidate header row. Exactly one is active per scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Some cell contains one of [`HEADER_KEYWORDS`], case-insensitively
    #[default]
    Keyword,
    /// At least this many cells are non-blank
    MinCells(usize),
}

impl HeaderPolicy {
    pub fn accepts(&self, row: &Row) -> bool {
        match self {
            HeaderPolicy::Keyword => row.iter().any(|cell| {
                let text = cell.to_text().trim().to_lowercase();
                !text.is_empty() && HEADER_KEYWORDS.iter().any(|kw| text.contains(kw))
            }),
            HeaderPolicy::MinCells(min) => non_empty_count(row) >= *min,
        }
    }
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderPolicy::Keyword => f.write_str("keyword"),
            HeaderPolicy::MinCells(n) => write!(f, "min-cells({})", n),
        }
    }
}

/// Parses `keyword`, `min-cells` (default threshold) or `min-cells:N`
impl FromStr for HeaderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "keyword" | "keywords" => Ok(HeaderPolicy::Keyword),
            "min-cells" | "generic" => Ok(HeaderPolicy::MinCells(DEFAULT_MIN_CELLS)),
            other => match other.strip_prefix("min-cells:") {
                Some(n) => n
                    .parse::<usize>()
                    .map(HeaderPolicy::MinCells)
                    .map_err(|_| format!("invalid cell threshold: {}", n)),
                None => Err(format!("unknown header policy: {}", other)),
            },
        }
    }
}

/// Number of cells whose stringified, trimmed value is non-empty
pub fn non_empty_count(row: &Row) -> usize {
    row.iter().filter(|cell| !cell.is_blank()).count()
}

/// Index of the first row within `scan_rows` accepted by `policy`.
///
/// Empty rows are skipped. The first accepted row wins even if a later row
/// would match better.
pub fn locate_header(grid: &RawGrid, scan_rows: usize, policy: HeaderPolicy) -> Option<usize> {
    grid.iter()
        .take(scan_rows)
        .enumerate()
        .filter(|(_, row)| !row.is_empty())
        .find(|(_, row)| policy.accepts(row))
        .map(|(index, _)| index)
}
