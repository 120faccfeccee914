//! Error types for the docfield-core library.

use thiserror::Error;

/// Main error type for the docfield library.
///
/// Only [`DocfieldError::UnsupportedFormat`] and [`DocfieldError::EmptyInput`]
/// escape a document extraction request; everything else degrades into a
/// low-confidence result.
#[derive(Error, Debug)]
pub enum DocfieldError {
    /// The file extension is not handled by any extractor.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A zero-byte upload.
    #[error("empty input: no bytes to extract from")]
    EmptyInput,

    /// Workbook processing error.
    #[error("workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to BOQ workbook parsing.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The bytes are not a readable workbook.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// The workbook contains no worksheets at all.
    #[error("no worksheet found in workbook")]
    NoWorksheetFound,

    /// No row in the scan window looks like a BOQ header.
    #[error("no BOQ header row found")]
    NoHeaderRowFound,
}

/// Failure of a single extraction strategy.
///
/// These never leave the extractor: the strategy is logged and simply
/// contributes no candidate.
#[derive(Error, Debug)]
pub enum StrategyError {
    /// The document could not be loaded.
    #[error("failed to load document: {0}")]
    Load(String),

    /// Text extraction failed.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Extraction succeeded but produced no usable text.
    #[error("no text extracted")]
    NoText,

    /// The table strategy found nothing tabular.
    #[error("no tables found")]
    NoTables,

    /// The Word document is malformed.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// The strategy panicked inside a parsing library.
    #[error("strategy panicked: {0}")]
    Panicked(String),

    /// The strategy did not report within its wall-clock budget.
    #[error("strategy timed out after {0}ms")]
    TimedOut(u64),

    /// I/O error (temporary file handling).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the docfield library.
pub type Result<T> = std::result::Result<T, DocfieldError>;
