use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IcpError {
    #[error("no AppCode provided (use --appcode, the APP_CODE environment variable, or appcode.txt)")]
    MissingAppCode,
    #[error("invalid delay between calls: {0} seconds")]
    InvalidDelay(f64),
    #[error("workbook not found: {0:?}")]
    WorkbookNotFound(PathBuf),
    #[error("workbook error in {path:?}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: umya_spreadsheet::XlsxError,
    },
    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, IcpError>;
