use manuscript::Run;

use crate::classify::{BlockKind, ClassifiedBlock};
use crate::diagnostic::Diagnostics;
use crate::markup::plain_text;
use crate::resolve::Label;
use crate::speaker::{SpeakerParser, SpeakerSplit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Dialogue,
    Narration,
    StageDirection,
}

/// A single line of script: something said, narrated or staged.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    /// Source block index.
    pub block: usize,
    pub speaker: Option<String>,
    pub runs: Vec<Run>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub block: usize,
    pub runs: Vec<Run>,
    /// Filled in by the reference resolver.
    pub target: Option<Label>,
}

/// Two or more mutually exclusive choices.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuBlock {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptBlock {
    Plain(Statement),
    Menu(MenuBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionOrigin {
    /// Opened by a heading block.
    Heading { block: usize, title: String },
    /// Created for content that precedes the first heading.
    Implicit,
}

/// Statements belonging to one label, up to the next heading.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSection {
    pub origin: SectionOrigin,
    /// Filled in by the reference resolver.
    pub label: Option<Label>,
    pub body: Vec<ScriptBlock>,
}

impl LabeledSection {
    fn new(origin: SectionOrigin) -> Self {
        LabeledSection {
            origin,
            label: None,
            body: Vec::new(),
        }
    }

    pub fn menus(&self) -> impl Iterator<Item = &MenuBlock> {
        self.body.iter().filter_map(|block| match block {
            ScriptBlock::Menu(menu) => Some(menu),
            ScriptBlock::Plain(_) => None,
        })
    }
}

/// Group classified blocks into labeled sections in a single pass.
pub fn aggregate(
    blocks: &[ClassifiedBlock<'_>],
    speakers: &SpeakerParser,
    diagnostics: &mut Diagnostics,
) -> Vec<LabeledSection> {
    let mut state = Aggregator::new(speakers, diagnostics);
    for classified in blocks {
        state.push(classified);
    }
    state.finish()
}

struct Aggregator<'p, 'd> {
    speakers: &'p SpeakerParser,
    diagnostics: &'d mut Diagnostics,
    sections: Vec<LabeledSection>,
    /// Choices waiting for the run of consecutive choice blocks to end.
    pending_choices: Vec<Choice>,
    /// A menu closed the current section's control flow.
    after_menu: bool,
}

impl<'p, 'd> Aggregator<'p, 'd> {
    fn new(speakers: &'p SpeakerParser, diagnostics: &'d mut Diagnostics) -> Self {
        Aggregator {
            speakers,
            diagnostics,
            sections: Vec::new(),
            pending_choices: Vec::new(),
            after_menu: false,
        }
    }

    fn push(&mut self, classified: &ClassifiedBlock<'_>) {
        let index = classified.index;
        let block = classified.block;

        match classified.kind {
            BlockKind::Heading => {
                self.close_menu();
                let title = block.text().split_whitespace().collect::<Vec<_>>().join(" ");
                self.sections
                    .push(LabeledSection::new(SectionOrigin::Heading { block: index, title }));
                self.after_menu = false;
            }
            BlockKind::Choice => {
                self.pending_choices.push(Choice {
                    block: index,
                    runs: block.runs_from(0),
                    target: None,
                });
            }
            BlockKind::Dialogue => {
                self.close_menu();
                let (speaker, body) = self.dialogue(index, &block.text());
                self.push_statement(Statement {
                    kind: StatementKind::Dialogue,
                    block: index,
                    speaker,
                    runs: block.runs_from(body),
                });
            }
            BlockKind::Narration | BlockKind::StageDirection => {
                self.close_menu();
                let kind = if classified.kind == BlockKind::Narration {
                    StatementKind::Narration
                } else {
                    StatementKind::StageDirection
                };
                self.push_statement(Statement {
                    kind,
                    block: index,
                    speaker: None,
                    runs: block.runs_from(0),
                });
            }
            BlockKind::Unknown => {}
        }
    }

    /// Speaker and start of the spoken text for a dialogue line.
    fn dialogue(&mut self, index: usize, text: &str) -> (Option<String>, usize) {
        match self.speakers.split(text) {
            SpeakerSplit::Speaker { name, body } => (Some(name), body),
            SpeakerSplit::NoSpeaker { body } => (None, body),
            SpeakerSplit::Ambiguous { prefix } => {
                self.diagnostics.warn(
                    index,
                    format!(
                        "ambiguous speaker '{}': treating the whole line as spoken text",
                        prefix
                    ),
                );
                (None, 0)
            }
        }
    }

    fn push_statement(&mut self, statement: Statement) {
        if self.after_menu {
            self.diagnostics.warn(
                statement.block,
                "unreachable: every choice of the preceding menu jumps away",
            );
            self.after_menu = false;
        }
        self.current_section().body.push(ScriptBlock::Plain(statement));
    }

    /// The section content goes into, creating the implicit start section
    /// on first use.
    fn current_section(&mut self) -> &mut LabeledSection {
        if self.sections.is_empty() {
            self.sections.push(LabeledSection::new(SectionOrigin::Implicit));
        }
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// End the current run of choices. A lone choice is not a menu and is
    /// demoted to narration.
    fn close_menu(&mut self) {
        let mut choices = std::mem::take(&mut self.pending_choices);
        if choices.len() >= 2 {
            self.current_section()
                .body
                .push(ScriptBlock::Menu(MenuBlock { choices }));
            self.after_menu = true;
        } else if let Some(choice) = choices.pop() {
            self.diagnostics.warn(
                choice.block,
                format!(
                    "menu with a single choice '{}' demoted to narration",
                    plain_text(&choice.runs)
                ),
            );
            self.push_statement(Statement {
                kind: StatementKind::Narration,
                block: choice.block,
                speaker: None,
                runs: choice.runs,
            });
        }
    }

    fn finish(mut self) -> Vec<LabeledSection> {
        self.close_menu();
        self.sections
    }
}
