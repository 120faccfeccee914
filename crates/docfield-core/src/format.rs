//! Input format dispatch by file extension.

use std::fmt;
use std::path::Path;

use crate::error::{DocfieldError, Result};

/// Document families the engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
    /// BOQ spreadsheet (xlsx, xlsm, xls, xlsb, ods).
    Workbook,
}

impl FileFormat {
    /// Determine the format from a filename's extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Workbook),
            "" => Err(DocfieldError::UnsupportedFormat(format!(
                "{} has no file extension",
                filename
            ))),
            other => Err(DocfieldError::UnsupportedFormat(format!(".{}", other))),
        }
    }

    /// Whether this is a purchase-order document rather than a BOQ workbook.
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Pdf | Self::Docx)
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
            Self::Workbook => write!(f, "workbook"),
        }
    }
}
