pub mod run;

use std::fmt;
use std::ops::Range;

pub use run::{Formatting, Run};

/// A manuscript as handed over by a reader: an ordered sequence of blocks.
/// Documents are never mutated once a reader has produced them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Text rendering of the manuscript that block spans point into.
    /// For markdown input this is the source itself; for docx input it is
    /// one line per paragraph.
    pub source: String,
}

impl Document {
    pub fn new(blocks: Vec<Block>, source: String) -> Self {
        Document { blocks, source }
    }

    /// Build a document from blocks alone, synthesizing a one-line-per-block
    /// source rendering and rewriting spans to point into it.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut source = String::new();
        let blocks = blocks
            .into_iter()
            .map(|mut block| {
                let start = source.len();
                source.push_str(&block.text().replace('\n', " "));
                block.span = start..source.len();
                source.push('\n');
                block
            })
            .collect();
        Document { blocks, source }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

/// Row/column position of a block inside a table (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCoords {
    pub row: usize,
    pub column: usize,
}

/// One paragraph-equivalent unit of the manuscript.
///
/// The concatenated run texts are the block's full text, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Author-assigned style name, exactly as the reader found it.
    pub style: String,
    pub runs: Vec<Run>,
    /// Nesting level for list paragraphs (0 = top level).
    pub list_level: Option<u8>,
    /// Table cell this block lives in, if any.
    pub cell: Option<CellCoords>,
    /// Byte span in `Document::source` for error reporting.
    pub span: Range<usize>,
}

impl Block {
    pub fn new(style: impl Into<String>, runs: Vec<Run>) -> Self {
        Block {
            style: style.into(),
            runs,
            list_level: None,
            cell: None,
            span: 0..0,
        }
    }

    /// Shorthand for a block holding a single unformatted run.
    pub fn plain(style: impl Into<String>, text: impl Into<String>) -> Self {
        Block::new(style, vec![Run::plain(text)])
    }

    pub fn with_list_level(mut self, level: u8) -> Self {
        self.list_level = Some(level);
        self
    }

    pub fn with_cell(mut self, row: usize, column: usize) -> Self {
        self.cell = Some(CellCoords { row, column });
        self
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = span;
        self
    }

    /// Full text of the block (all runs concatenated).
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// True when the block has no visible text.
    pub fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    /// Runs covering the block text from byte `offset` onwards, with leading
    /// and trailing whitespace removed. Runs are split where the offset
    /// falls inside one; formatting of each piece is preserved.
    pub fn runs_from(&self, offset: usize) -> Vec<Run> {
        let mut sliced = Vec::new();
        let mut pos = 0;
        for run in &self.runs {
            let end = pos + run.text.len();
            if end > offset {
                let skip = offset.saturating_sub(pos);
                sliced.push(Run::new(&run.text[skip..], run.format));
            }
            pos = end;
        }
        trim_runs(sliced)
    }
}

fn trim_runs(mut runs: Vec<Run>) -> Vec<Run> {
    while let Some(first) = runs.first_mut() {
        let trimmed = first.text.trim_start();
        if trimmed.is_empty() {
            runs.remove(0);
        } else {
            first.text = trimmed.to_string();
            break;
        }
    }
    while let Some(last) = runs.last_mut() {
        let trimmed = last.text.trim_end();
        if trimmed.is_empty() {
            runs.pop();
        } else {
            last.text = trimmed.to_string();
            break;
        }
    }
    runs
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.style)?;
        if let Some(level) = self.list_level {
            write!(f, " (level {})", level)?;
        }
        if let Some(cell) = self.cell {
            write!(f, " (cell {},{})", cell.row, cell.column)?;
        }
        write!(f, " ")?;
        for run in &self.runs {
            write!(f, "{}", run)?;
        }
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            writeln!(f, "{}", block)?;
        }
        Ok(())
    }
}
