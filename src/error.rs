use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Invalid workbook: {0}")]
    InvalidWorkbook(String),

    #[error("No employee records in workbook")]
    NoRecords,

    #[error("Record {row} is missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },

    #[error("Duplicate employee identity `{0}`")]
    DuplicateIdentity(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Could not start render pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
