use crate::header::{DEFAULT_MIN_CELLS, DEFAULT_SCAN_ROWS, HeaderPolicy};
use crate::ingest::IngestOptions;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which header acceptance rule the server runs with
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// First row with a cell mentioning exercise, name, difficulty, muscle, equipment or video
    Keyword,
    /// First row with at least `--min-header-cells` populated cells
    MinCells,
}

/// Server settings. Every flag can also come from the environment or a `.env` file.
#[derive(Clone, Debug, Parser)]
#[command(name = "exercise-browser", version, about = "Serve an exercise spreadsheet over HTTP")]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 3001)]
    pub port: u16,

    /// Where uploads are stored and read back from on start-up
    #[arg(long, env = "UPLOAD_DIR", default_value = "uploads")]
    pub upload_dir: PathBuf,

    /// Browser UI assets
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Rows scanned for the header before giving up
    #[arg(long, env = "HEADER_SCAN_ROWS", default_value_t = DEFAULT_SCAN_ROWS)]
    pub header_scan_rows: usize,

    #[arg(long, env = "HEADER_POLICY", value_enum, default_value_t = PolicyArg::Keyword)]
    pub header_policy: PolicyArg,

    #[arg(long, env = "MIN_HEADER_CELLS", default_value_t = DEFAULT_MIN_CELLS)]
    pub min_header_cells: usize,

    /// Largest accepted upload, in megabytes
    #[arg(long, env = "MAX_UPLOAD_MB", default_value_t = 25)]
    pub max_upload_mb: usize,
}

impl Config {
    pub fn header_policy(&self) -> HeaderPolicy {
        match self.header_policy {
            PolicyArg::Keyword => HeaderPolicy::Keyword,
            PolicyArg::MinCells => HeaderPolicy::MinCells(self.min_header_cells),
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            header_policy: self.header_policy(),
            header_scan_rows: self.header_scan_rows,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3001,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("static"),
            header_scan_rows: DEFAULT_SCAN_ROWS,
            header_policy: PolicyArg::Keyword,
            min_header_cells: DEFAULT_MIN_CELLS,
            max_upload_mb: 25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "exercise-browser",
            "--port",
            "8080",
            "--header-policy",
            "min-cells",
            "--min-header-cells",
            "4",
            "--upload-dir",
            "/tmp/x",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.header_policy(), HeaderPolicy::MinCells(4));
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/x"));
        assert_eq!(config.bind_addr(), format!("{}:8080", config.host));
    }

    #[test]
    fn default_policy_is_keyword() {
        let config = Config::default();
        assert_eq!(config.ingest_options(), IngestOptions::default());
        assert_eq!(config.max_upload_bytes(), 25 * 1024 * 1024);
    }
}
