use std::fmt;

use manuscript::{Block, Document};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::config::StyleRule;
use crate::diagnostic::Diagnostics;
use crate::error::ConvertError;
use crate::speaker::SpeakerParser;

/// Semantic role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Heading,
    Dialogue,
    Narration,
    Choice,
    StageDirection,
    /// Blank blocks. Never reaches the aggregator.
    #[serde(skip_deserializing)]
    Unknown,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Heading => "heading",
            BlockKind::Dialogue => "dialogue",
            BlockKind::Narration => "narration",
            BlockKind::Choice => "choice",
            BlockKind::StageDirection => "stage direction",
            BlockKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A document block together with its assigned kind.
#[derive(Debug, Clone, Copy)]
pub struct ClassifiedBlock<'a> {
    /// Position of the block in the source document.
    pub index: usize,
    pub block: &'a Block,
    pub kind: BlockKind,
}

#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    kind: BlockKind,
    dialogue_like: bool,
}

/// Ordered table of style-name predicates. The first matching rule wins.
#[derive(Debug)]
pub struct StyleClassifier {
    rules: Vec<CompiledRule>,
}

impl StyleClassifier {
    pub fn new(rules: &[StyleRule]) -> Result<Self, ConvertError> {
        let rules = rules
            .iter()
            .map(|rule| {
                let pattern = RegexBuilder::new(&rule.style)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConvertError::InvalidRule {
                        pattern: rule.style.clone(),
                        source,
                    })?;
                Ok(CompiledRule {
                    pattern,
                    kind: rule.kind,
                    dialogue_like: rule.dialogue_like,
                })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;
        Ok(StyleClassifier { rules })
    }

    /// Assign exactly one kind to `block`. Blank blocks are `Unknown`;
    /// unmatched styles fall back to narration with a warning.
    pub fn classify(
        &self,
        index: usize,
        block: &Block,
        speakers: &SpeakerParser,
        diagnostics: &mut Diagnostics,
    ) -> BlockKind {
        if block.is_blank() {
            return BlockKind::Unknown;
        }

        let style = block.style.trim();
        match self.rules.iter().find(|rule| rule.pattern.is_match(style)) {
            Some(rule) if rule.dialogue_like && speakers.split(&block.text()).is_speaker() => {
                BlockKind::Dialogue
            }
            Some(rule) => rule.kind,
            None => {
                diagnostics.warn(
                    index,
                    format!("unrecognized style '{}', defaulting to narration", style),
                );
                BlockKind::Narration
            }
        }
    }
}

/// Classify every block of `document`, dropping blank ones.
pub fn classify_document<'a>(
    document: &'a Document,
    classifier: &StyleClassifier,
    speakers: &SpeakerParser,
    diagnostics: &mut Diagnostics,
) -> Vec<ClassifiedBlock<'a>> {
    document
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| ClassifiedBlock {
            index,
            block,
            kind: classifier.classify(index, block, speakers, diagnostics),
        })
        .filter(|classified| classified.kind != BlockKind::Unknown)
        .collect()
}
