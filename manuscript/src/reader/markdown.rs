use std::ops::Range;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser as CmarkParser, Tag, TagEnd};

use crate::document::{Block, CellCoords, Document, Formatting, Run};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read a Markdown manuscript into a [`Document`].
///
/// Markdown structure is mapped onto the word-processor style names a docx
/// manuscript would carry, so both inputs classify the same way:
/// headings become "Heading N", list items "List Bullet"/"List Number",
/// block quotes "Quote", code blocks "Code", everything else "Normal".
pub fn read_markdown(source: &str) -> Document {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = CmarkParser::new_ext(source, options);

    let mut state = ReadState::default();
    for (event, range) in parser.into_offset_iter() {
        state.process(event, range);
    }
    state.finish_block();

    tracing::debug!(blocks = state.blocks.len(), "read markdown manuscript");
    Document::new(state.blocks, source.to_string())
}

// ---------------------------------------------------------------------------
// Read state
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ReadState {
    blocks: Vec<Block>,
    current: Option<BlockBuilder>,
    /// Open lists, innermost last. `true` = ordered.
    lists: Vec<bool>,
    quote_depth: usize,
    table: Option<CellCoords>,
    bold: u32,
    italic: u32,
    underline: u32,
    strikethrough: u32,
}

struct BlockBuilder {
    style: String,
    runs: Vec<Run>,
    list_level: Option<u8>,
    cell: Option<CellCoords>,
    span: Range<usize>,
    /// Opened by a list item; the item's first paragraph reuses it.
    from_item: bool,
}

impl BlockBuilder {
    fn new(style: impl Into<String>, span: Range<usize>) -> Self {
        BlockBuilder {
            style: style.into(),
            runs: Vec::new(),
            list_level: None,
            cell: None,
            span,
            from_item: false,
        }
    }

    fn push_text(&mut self, text: &str, format: Formatting) {
        if let Some(last) = self.runs.last_mut().filter(|r| r.format == format) {
            last.text.push_str(text);
        } else {
            self.runs.push(Run::new(text, format));
        }
    }

    fn into_block(mut self) -> Block {
        if let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end_matches('\n').len();
            last.text.truncate(trimmed);
        }
        let mut block = Block::new(self.style, self.runs).with_span(self.span);
        if let Some(level) = self.list_level {
            block = block.with_list_level(level);
        }
        if let Some(cell) = self.cell {
            block = block.with_cell(cell.row, cell.column);
        }
        block
    }
}

impl ReadState {
    fn process(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                let style = format!("Heading {}", heading_level_to_u8(&level));
                self.begin_block(BlockBuilder::new(style, range));
            }

            Event::Start(Tag::Paragraph) => {
                let reuse = self
                    .current
                    .as_ref()
                    .is_some_and(|b| b.from_item && b.runs.is_empty());
                if !reuse {
                    let style = self.context_style();
                    self.begin_block(BlockBuilder::new(style, range));
                }
            }

            Event::Start(Tag::Item) => {
                let ordered = self.lists.last().copied().unwrap_or(false);
                let style = if ordered { "List Number" } else { "List Bullet" };
                let mut builder = BlockBuilder::new(style, range);
                builder.list_level = Some(self.lists.len().saturating_sub(1) as u8);
                builder.from_item = true;
                self.begin_block(builder);
            }

            Event::Start(Tag::List(start)) => {
                self.finish_block();
                self.lists.push(start.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.finish_block();
                self.lists.pop();
            }

            Event::Start(Tag::BlockQuote(_)) => {
                self.finish_block();
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.finish_block();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.begin_block(BlockBuilder::new("Code", range));
            }

            // Tables: one block per cell
            Event::Start(Tag::Table(_)) => {
                self.finish_block();
                self.table = Some(CellCoords { row: 0, column: 0 });
            }
            Event::End(TagEnd::Table) => {
                self.finish_block();
                self.table = None;
            }
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                if let Some(cell) = self.table.as_mut() {
                    cell.row += 1;
                    cell.column = 0;
                }
            }
            Event::Start(Tag::TableCell) => {
                let mut builder = BlockBuilder::new("Normal", range);
                builder.cell = self.table;
                self.begin_block(builder);
            }
            Event::End(TagEnd::TableCell) => {
                self.finish_block();
                if let Some(cell) = self.table.as_mut() {
                    cell.column += 1;
                }
            }

            Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::CodeBlock)
            | Event::End(TagEnd::Item) => {
                self.finish_block();
            }

            // Inline formatting
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.italic += 1,
            Event::End(TagEnd::Emphasis) => self.italic = self.italic.saturating_sub(1),
            Event::Start(Tag::Strikethrough) => self.strikethrough += 1,
            Event::End(TagEnd::Strikethrough) => {
                self.strikethrough = self.strikethrough.saturating_sub(1)
            }
            Event::InlineHtml(html) => match html.trim().to_ascii_lowercase().as_str() {
                "<u>" => self.underline += 1,
                "</u>" => self.underline = self.underline.saturating_sub(1),
                _ => {}
            },

            Event::Text(text) | Event::Code(text) => self.push_text(&text, range),
            Event::SoftBreak => self.push_text(" ", range),
            Event::HardBreak => self.push_text("\n", range),

            Event::Rule => self.finish_block(),

            _ => {}
        }
    }

    /// Style for a paragraph given the enclosing containers.
    fn context_style(&self) -> &'static str {
        if self.quote_depth > 0 {
            "Quote"
        } else if !self.lists.is_empty() {
            "List Paragraph"
        } else {
            "Normal"
        }
    }

    fn format(&self) -> Formatting {
        Formatting {
            bold: self.bold > 0,
            italic: self.italic > 0,
            underline: self.underline > 0,
            strikethrough: self.strikethrough > 0,
        }
    }

    fn push_text(&mut self, text: &str, range: Range<usize>) {
        let format = self.format();
        if self.current.is_none() {
            let style = self.context_style();
            self.current = Some(BlockBuilder::new(style, range));
        }
        if let Some(builder) = self.current.as_mut() {
            builder.push_text(text, format);
        }
    }

    fn begin_block(&mut self, builder: BlockBuilder) {
        self.finish_block();
        self.current = Some(builder);
    }

    fn finish_block(&mut self) {
        if let Some(builder) = self.current.take() {
            self.blocks.push(builder.into_block());
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn heading_level_to_u8(level: &HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
