use std::fmt::{self, Write};

use crate::aggregate::{LabeledSection, MenuBlock, ScriptBlock, Statement, StatementKind};
use crate::config::ScriptConfig;
use crate::error::ConvertError;
use crate::markup::{escape, plain_text, translate_runs};
use crate::resolve::{Label, Resolution};

/// Render a resolved script as Ren'Py source.
///
/// Output is a pure function of the resolution and config. Nothing is
/// returned unless the whole script rendered.
pub fn emit(resolution: &Resolution, config: &ScriptConfig) -> Result<String, ConvertError> {
    let mut out = String::new();
    write!(out, "{}", Script { resolution, config }).map_err(|_| ConvertError::Render)?;
    Ok(out)
}

struct Script<'a> {
    resolution: &'a Resolution,
    config: &'a ScriptConfig,
}

impl Script<'_> {
    fn indent(&self, depth: usize) -> String {
        " ".repeat(self.config.indent * depth)
    }

    fn write_section(&self, f: &mut fmt::Formatter<'_>, section: &LabeledSection) -> fmt::Result {
        let label = section.label.as_ref().ok_or(fmt::Error)?;
        writeln!(f, "label {}:", label)?;
        if section.body.is_empty() {
            return writeln!(f, "{}pass", self.indent(1));
        }
        for block in &section.body {
            match block {
                ScriptBlock::Plain(statement) => self.write_statement(f, statement)?,
                ScriptBlock::Menu(menu) => self.write_menu(f, menu)?,
            }
        }
        Ok(())
    }

    fn write_statement(&self, f: &mut fmt::Formatter<'_>, statement: &Statement) -> fmt::Result {
        let indent = self.indent(1);
        match statement.kind {
            StatementKind::Dialogue | StatementKind::Narration => {
                let text = translate_runs(&statement.runs);
                match &statement.speaker {
                    Some(name) => writeln!(f, "{}\"{}\" \"{}\"", indent, escape(name), text),
                    None => writeln!(f, "{}\"{}\"", indent, text),
                }
            }
            StatementKind::StageDirection => {
                let text = plain_text(&statement.runs);
                for line in text.lines().map(str::trim) {
                    if line.is_empty() {
                        writeln!(f, "{}#", indent)?;
                    } else if self.is_passthrough(line) {
                        writeln!(f, "{}{}", indent, line)?;
                    } else {
                        writeln!(f, "{}# {}", indent, line)?;
                    }
                }
                Ok(())
            }
        }
    }

    fn write_menu(&self, f: &mut fmt::Formatter<'_>, menu: &MenuBlock) -> fmt::Result {
        writeln!(f, "{}menu:", self.indent(1))?;
        for choice in &menu.choices {
            let target = choice.target.as_ref().ok_or(fmt::Error)?;
            writeln!(f, "{}\"{}\":", self.indent(2), translate_runs(&choice.runs))?;
            writeln!(f, "{}jump {}", self.indent(3), target)?;
        }
        Ok(())
    }

    fn write_entry(&self, f: &mut fmt::Formatter<'_>, label: &Label, target: &Label) -> fmt::Result {
        writeln!(f, "label {}:", label)?;
        writeln!(f, "{}jump {}", self.indent(1), target)
    }

    fn write_terminal(&self, f: &mut fmt::Formatter<'_>, label: &Label) -> fmt::Result {
        writeln!(f, "label {}:", label)?;
        writeln!(f, "{}return", self.indent(1))
    }

    /// A direction line starting with a script keyword is emitted as a
    /// statement; everything else becomes a comment. After a word keyword
    /// the line must not read as a sentence: no commas, no closing
    /// sentence punctuation.
    fn is_passthrough(&self, line: &str) -> bool {
        self.config.passthrough.iter().any(|keyword| {
            let Some(rest) = line.strip_prefix(keyword.as_str()) else {
                return false;
            };
            if !keyword.chars().all(char::is_alphanumeric) {
                return true;
            }
            (rest.is_empty() || rest.starts_with(char::is_whitespace)) && !reads_as_prose(rest)
        })
    }
}

fn reads_as_prose(text: &str) -> bool {
    text.contains(',') || text.trim_end().ends_with(['.', '!', '?'])
}

impl fmt::Display for Script<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        let mut separate = |f: &mut fmt::Formatter<'_>| {
            if first {
                first = false;
                Ok(())
            } else {
                writeln!(f)
            }
        };

        if let Some(stub) = &self.resolution.entry {
            separate(f)?;
            self.write_entry(f, &stub.label, &stub.target)?;
        }
        for section in &self.resolution.sections {
            separate(f)?;
            self.write_section(f, section)?;
        }
        if let Some(terminal) = &self.resolution.terminal {
            separate(f)?;
            self.write_terminal(f, terminal)?;
        }
        Ok(())
    }
}
