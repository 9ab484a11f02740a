use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TableExportError>;

#[derive(Error, Debug)]
pub enum TableExportError {
    #[error("invalid columns: {0}")]
    InvalidColumns(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid row: {0}")]
    InvalidRow(String),

    #[error("unknown page handle: {0}")]
    UnknownPage(usize),

    #[error("unknown font handle: {0}")]
    UnknownFont(usize),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("pdf inspection failed: {0}")]
    Inspect(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl From<lopdf::Error> for TableExportError {
    fn from(err: lopdf::Error) -> Self {
        TableExportError::Inspect(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_detail() {
        let err = TableExportError::InvalidColumns("column list is empty".to_string());
        assert_eq!(err.to_string(), "invalid columns: column list is empty");

        let err = TableExportError::UnknownPage(3);
        assert_eq!(err.to_string(), "unknown page handle: 3");
    }

    #[test]
    fn io_errors_convert() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "read-only");
        let err: TableExportError = io_err.into();
        assert!(matches!(err, TableExportError::Io(_)));
    }
}
