use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Invalid range notation: {0}")]
    Range(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),
}
