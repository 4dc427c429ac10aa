pub mod docx;
pub mod markdown;

use std::path::Path;

use crate::document::Document;
use crate::error::ReadError;

/// Manuscript container formats understood by the readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Docx,
    Markdown,
}

impl InputFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<InputFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(InputFormat::Docx),
            "md" | "markdown" | "txt" => Some(InputFormat::Markdown),
            _ => None,
        }
    }
}

/// Read a manuscript from raw bytes in the given format.
pub fn read(format: InputFormat, bytes: Vec<u8>) -> Result<Document, ReadError> {
    match format {
        InputFormat::Docx => docx::read_docx(&bytes),
        InputFormat::Markdown => {
            let source = String::from_utf8(bytes)?;
            Ok(markdown::read_markdown(&source))
        }
    }
}
