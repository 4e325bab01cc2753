/*!
# Exercise Browser

Loads an exercise spreadsheet into memory and serves it to a browser grid
with filtering, search and pagination.

## Overview

Exercise libraries usually arrive as workbooks with a cover page or a block
of instructions above the real table, and with a column set that changes
from one revision to the next. Ingestion therefore makes no assumption about
where the table starts or what its columns are called: it finds the header
row, maps every column it finds, and serves whatever came out.

## Pipeline

1. **Loader** reads xlsx/xls/ods (via calamine) or CSV bytes into a grid of
   cells.
2. **Header locator** walks the first rows of the grid and picks the first
   one that looks like column names.
3. **Record mapper** turns every row below it whose first cell is filled into
   a record keyed by the header text, numbering records from 1.
4. **Record store** publishes the finished set with a single swap. A failed
   upload never touches what is being served.

## Modules

- **grid**: cell values and the raw grid
- **loader**: workbook and CSV reading
- **header**: header row detection policies
- **mapper**: rows to records
- **record**: record and record set types
- **ingest**: the loader, locator and mapper chained together
- **store**: atomically replaceable record set
- **query**: filters, name search, pagination, distinct values
- **video**: YouTube link normalization
- **saving**: storage of the uploaded source file
- **config**: command line and environment settings
- **app**: HTTP routes (feature `web`)

## REST API Endpoints

- `POST /api/upload` - Upload a spreadsheet (multipart field `file`)
- `GET /api/exercises` - Filtered, paginated exercises
- `GET /api/filters` - Distinct values for every filter
- `GET /api/debug/excel` - Raw preview of the stored spreadsheet
- `POST /api/debug/load-exercises` - Re-read the stored spreadsheet
*/

pub mod config;
pub mod error;
pub mod grid;
pub mod header;
pub mod ingest;
pub mod loader;
pub mod mapper;
pub mod query;
pub mod record;
pub mod saving;
pub mod store;
pub mod video;

#[cfg(feature = "web")]
pub mod app;

pub use error::{IngestError, Result};
pub use grid::{CellValue, RawGrid, Row};
pub use header::{HeaderPolicy, locate_header};
pub use ingest::{IngestOptions, Ingested, ingest};
pub use loader::SourceFormat;
pub use mapper::map_records;
pub use record::{Record, RecordSet};
pub use store::RecordStore;
