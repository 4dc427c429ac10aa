use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic as Report, Label, Severity};
use manuscript::Document;

/// A non-fatal observation recorded during conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Index of the block in the source document, when one is to blame.
    pub block: Option<usize>,
    pub message: String,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn warning(block: impl Into<Option<usize>>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            block: block.into(),
            message: message.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn is_warning(&self) -> bool {
        self.severity >= Severity::Warning
    }

    /// Convert to a codespan-reporting diagnostic labelled at the block's
    /// span in `document.source`.
    pub fn to_diagnostic(&self, file_id: usize, document: &Document) -> Report<usize> {
        let labels = self
            .block
            .and_then(|index| document.blocks.get(index))
            .map(|block| vec![Label::primary(file_id, block.span.clone())])
            .unwrap_or_default();
        Report::new(self.severity)
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.block {
            Some(index) => write!(f, "block {}: {}", index, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Append-only collector threaded through every conversion stage.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(block = ?diagnostic.block, "{}", diagnostic.message);
        self.entries.push(diagnostic);
    }

    pub fn warn(&mut self, block: impl Into<Option<usize>>, message: impl Into<String>) {
        self.push(Diagnostic::warning(block, message));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
