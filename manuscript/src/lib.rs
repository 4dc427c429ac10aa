pub mod document;
pub mod error;
pub mod reader;

pub use document::{Block, CellCoords, Document, Formatting, Run};
pub use error::ReadError;
pub use reader::docx::read_docx;
pub use reader::markdown::read_markdown;
