use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};

use quick_xml::Reader as XmlReader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::document::{Block, CellCoords, Document, Formatting, Run};
use crate::error::ReadError;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Read a `.docx` container into a [`Document`].
///
/// Only the main document part and the style table are consulted. Each
/// `w:p` becomes one block, each `w:r` one run. Style ids are resolved to
/// their display names through `word/styles.xml` when it is present.
pub fn read_docx(bytes: &[u8]) -> Result<Document, ReadError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| ReadError::MissingPart(DOCUMENT_PART.to_string()))?;
    let styles = match read_part(&mut archive, STYLES_PART)? {
        Some(xml) => parse_styles(&xml)?,
        None => HashMap::new(),
    };

    let blocks = parse_body(&document_xml, &styles)?;
    tracing::debug!(
        blocks = blocks.len(),
        styles = styles.len(),
        "read docx manuscript"
    );
    Ok(Document::from_blocks(blocks))
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>, ReadError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut buffer = Vec::new();
    entry.read_to_end(&mut buffer)?;
    Ok(Some(buffer))
}

// ---------------------------------------------------------------------------
// Style table
// ---------------------------------------------------------------------------

/// Map style ids ("Heading1") to display names ("heading 1").
fn parse_styles(xml: &[u8]) -> Result<HashMap<String, String>, ReadError> {
    let mut reader = XmlReader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut names = HashMap::new();
    let mut current_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"style" => current_id = attr_value(e, b"styleId"),
                b"name" => {
                    if let (Some(id), Some(name)) = (current_id.as_ref(), attr_value(e, b"val")) {
                        names.insert(id.clone(), name);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => current_id = None,
            Ok(Event::Eof) => break,
            Err(err) => return Err(ReadError::xml(STYLES_PART, err)),
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

// ---------------------------------------------------------------------------
// Document body
// ---------------------------------------------------------------------------

fn parse_body(xml: &[u8], styles: &HashMap<String, String>) -> Result<Vec<Block>, ReadError> {
    let mut reader = XmlReader::from_reader(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut state = BodyState::new(styles);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => state.open(e, false),
            Ok(Event::Empty(ref e)) => state.open(e, true),
            Ok(Event::End(ref e)) => state.close(e.local_name().as_ref()),
            Ok(Event::Text(ref t)) if state.wants_text() => {
                let text = t
                    .unescape()
                    .map_err(|err| ReadError::xml(DOCUMENT_PART, err))?;
                state.push_text(&text);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ReadError::xml(DOCUMENT_PART, err)),
            _ => {}
        }
        buf.clear();
    }

    Ok(state.blocks)
}

struct ParagraphBuilder {
    style_id: Option<String>,
    list_level: Option<u8>,
    cell: Option<CellCoords>,
    runs: Vec<Run>,
}

/// Position inside the innermost open table. `None` until the first
/// row/cell has been entered.
#[derive(Default)]
struct TableCursor {
    row: Option<usize>,
    column: Option<usize>,
}

struct BodyState<'s> {
    styles: &'s HashMap<String, String>,
    blocks: Vec<Block>,
    paragraph: Option<ParagraphBuilder>,
    /// Paragraphs nested in text boxes are folded into the outer one.
    paragraph_depth: usize,
    tables: Vec<TableCursor>,
    in_paragraph_props: bool,
    in_run: bool,
    in_run_props: bool,
    in_text: bool,
    /// Whether the current `w:r` already produced a run.
    run_started: bool,
    run_format: Formatting,
}

impl<'s> BodyState<'s> {
    fn new(styles: &'s HashMap<String, String>) -> Self {
        BodyState {
            styles,
            blocks: Vec::new(),
            paragraph: None,
            paragraph_depth: 0,
            tables: Vec::new(),
            in_paragraph_props: false,
            in_run: false,
            in_run_props: false,
            in_text: false,
            run_started: false,
            run_format: Formatting::PLAIN,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool) {
        let name = e.local_name();
        let local = name.as_ref();
        match local {
            b"p" => {
                self.paragraph_depth += 1;
                if self.paragraph_depth == 1 {
                    self.paragraph = Some(ParagraphBuilder {
                        style_id: None,
                        list_level: None,
                        cell: self.current_cell(),
                        runs: Vec::new(),
                    });
                }
            }
            b"pPr" => self.in_paragraph_props = true,
            b"pStyle" if self.in_paragraph_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.style_id = attr_value(e, b"val");
                }
            }
            b"ilvl" if self.in_paragraph_props => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.list_level = attr_value(e, b"val").and_then(|v| v.parse().ok());
                }
            }
            b"r" => {
                self.in_run = true;
                self.run_started = false;
                self.run_format = Formatting::PLAIN;
            }
            b"rPr" => self.in_run_props = true,
            b"b" | b"i" | b"u" | b"strike" | b"dstrike" if self.in_run_format_props() => {
                let enabled = flag_enabled(e);
                match local {
                    b"b" => self.run_format.bold = enabled,
                    b"i" => self.run_format.italic = enabled,
                    b"u" => self.run_format.underline = enabled,
                    _ => self.run_format.strikethrough = enabled,
                }
            }
            b"t" => self.in_text = true,
            b"tab" if self.in_run && !self.in_paragraph_props => self.push_text("\t"),
            b"br" | b"cr" if self.in_run => self.push_text("\n"),
            b"tbl" => self.tables.push(TableCursor::default()),
            b"tr" => {
                if let Some(table) = self.tables.last_mut() {
                    table.row = Some(table.row.map_or(0, |r| r + 1));
                    table.column = None;
                }
            }
            b"tc" => {
                if let Some(table) = self.tables.last_mut() {
                    table.column = Some(table.column.map_or(0, |c| c + 1));
                }
            }
            _ => {}
        }

        if empty {
            self.close(local);
        }
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"p" => {
                self.paragraph_depth = self.paragraph_depth.saturating_sub(1);
                if self.paragraph_depth == 0 {
                    self.finish_paragraph();
                }
            }
            b"pPr" => self.in_paragraph_props = false,
            b"r" => self.in_run = false,
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"tbl" => {
                self.tables.pop();
            }
            _ => {}
        }
    }

    fn in_run_format_props(&self) -> bool {
        self.in_run && self.in_run_props && !self.in_paragraph_props
    }

    fn wants_text(&self) -> bool {
        self.in_text && self.in_run && self.paragraph.is_some()
    }

    fn push_text(&mut self, text: &str) {
        let Some(paragraph) = self.paragraph.as_mut() else {
            return;
        };
        match paragraph.runs.last_mut() {
            Some(last) if self.run_started => last.text.push_str(text),
            _ => {
                paragraph.runs.push(Run::new(text, self.run_format));
                self.run_started = true;
            }
        }
    }

    fn current_cell(&self) -> Option<CellCoords> {
        self.tables.last().map(|table| CellCoords {
            row: table.row.unwrap_or(0),
            column: table.column.unwrap_or(0),
        })
    }

    fn finish_paragraph(&mut self) {
        let Some(paragraph) = self.paragraph.take() else {
            return;
        };
        let style = match paragraph.style_id {
            Some(id) => self.styles.get(&id).cloned().unwrap_or(id),
            None => "Normal".to_string(),
        };
        let mut block = Block::new(style, paragraph.runs);
        if let Some(level) = paragraph.list_level {
            block = block.with_list_level(level);
        }
        if let Some(cell) = paragraph.cell {
            block = block.with_cell(cell.row, cell.column);
        }
        self.blocks.push(block);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read an attribute by local name, ignoring its namespace prefix.
fn attr_value(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    for attr in element.attributes().with_checks(false) {
        let Ok(attr) = attr else {
            continue;
        };
        if attr.key.local_name().as_ref() == key {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

/// Toggle elements (`w:b`, `w:u`, ...) are on unless `w:val` says otherwise.
fn flag_enabled(element: &BytesStart<'_>) -> bool {
    match attr_value(element, b"val") {
        None => true,
        Some(value) => !matches!(
            value.to_ascii_lowercase().as_str(),
            "0" | "false" | "off" | "none"
        ),
    }
}
