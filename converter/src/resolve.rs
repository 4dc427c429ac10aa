use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::aggregate::{LabeledSection, ScriptBlock, SectionOrigin};
use crate::config::ScriptConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::ConvertError;
use crate::markup::plain_text;

/// A unique named entry point in the generated script.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Words the script parser will not accept as a label name: statement
/// keywords plus Python's reserved words. Sorted for binary search.
const RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "at", "await", "behind", "break", "call", "camera", "class",
    "continue", "def", "del", "elif", "else", "except", "expression", "finally", "for", "from",
    "global", "hide", "if", "image", "import", "in", "init", "is", "jump", "lambda", "menu",
    "nonlocal", "not", "onlayer", "or", "pass", "python", "raise", "return", "scene", "show",
    "transform", "try", "while", "with", "yield", "zorder",
];

/// True when `name` is a keyword that cannot name a label.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.binary_search(&name).is_ok()
}

/// True when `name` can be used verbatim as a label: an ASCII identifier
/// that is not a reserved word.
pub fn is_valid_label(name: &str) -> bool {
    let mut chars = name.chars();
    let head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !is_reserved(name)
}

/// Turn heading text into a label: lowercase ASCII alphanumerics, every
/// other run of characters collapsed to one `_`. Labels that would start
/// with a digit or collide with a keyword get a `label_` prefix.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut separator = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if separator && !slug.is_empty() {
                slug.push('_');
            }
            separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            separator = true;
        }
    }
    if slug.starts_with(|c: char| c.is_ascii_digit()) || is_reserved(&slug) {
        slug.insert_str(0, "label_");
    }
    slug
}

/// Labels handed out during one conversion. Suffix counters live here,
/// never in shared state, so every conversion starts from scratch.
#[derive(Debug, Default)]
pub struct LabelTable {
    taken: HashSet<String>,
    suffixes: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `base` if free, otherwise the first free `base_N`.
    /// The flag tells whether a suffix was needed.
    pub fn claim(&mut self, base: &str) -> (Label, bool) {
        if self.taken.insert(base.to_string()) {
            (Label(base.to_string()), false)
        } else {
            (self.claim_suffixed(base), true)
        }
    }

    /// Claim `base_N` for the next free N, starting at 1.
    pub fn claim_suffixed(&mut self, base: &str) -> Label {
        let counter = self.suffixes.entry(base.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{}_{}", base, counter);
            if self.taken.insert(candidate.clone()) {
                return Label(candidate);
            }
        }
    }

    /// Mark `name` as used without handing it to any section.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}

/// `label <entry>: jump <target>` prepended when the first section is not
/// itself the entry label.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryStub {
    pub label: Label,
    pub target: Label,
}

/// Sections with every label and jump target filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub sections: Vec<LabeledSection>,
    pub entry: Option<EntryStub>,
    /// Synthesized label that ends execution, when some choice needs it.
    pub terminal: Option<Label>,
}

/// Assign a label to every section and a jump target to every choice.
pub fn resolve(
    mut sections: Vec<LabeledSection>,
    config: &ScriptConfig,
    diagnostics: &mut Diagnostics,
) -> Result<Resolution, ConvertError> {
    let mut table = LabelTable::new();

    // The entry label always belongs to the first section. When the first
    // section is a heading with some other name, keep the entry label free
    // for a stub that jumps there.
    let needs_stub = match sections.first().map(|s| &s.origin) {
        Some(SectionOrigin::Heading { title, .. }) => slugify(title) != config.entry_label,
        _ => false,
    };
    if needs_stub {
        table.reserve(&config.entry_label);
    }

    for section in sections.iter_mut() {
        let label = match &section.origin {
            SectionOrigin::Implicit => table.claim(&config.entry_label).0,
            SectionOrigin::Heading { block, title } => {
                let slug = slugify(title);
                if slug.is_empty() {
                    let label = table.claim_suffixed(&config.fallback_label);
                    diagnostics.warn(
                        *block,
                        format!(
                            "heading '{}' has no characters usable in a label, using '{}'",
                            title, label
                        ),
                    );
                    label
                } else {
                    let (label, renamed) = table.claim(&slug);
                    if renamed {
                        diagnostics.push(
                            Diagnostic::warning(
                                *block,
                                format!("duplicate label '{}' renamed to '{}'", slug, label),
                            )
                            .with_note(format!("heading: {}", title)),
                        );
                    }
                    label
                }
            }
        };
        section.label = Some(label);
    }

    let terminal = sections
        .last()
        .is_some_and(|s| s.menus().next().is_some())
        .then(|| table.claim(&config.terminal_label).0);

    link_choices(&mut sections, terminal.as_ref())?;

    let entry = match (needs_stub, sections.first().and_then(|s| s.label.clone())) {
        (true, Some(target)) => Some(EntryStub {
            label: Label(config.entry_label.clone()),
            target,
        }),
        _ => None,
    };

    tracing::debug!(
        sections = sections.len(),
        terminal = ?terminal,
        entry_stub = entry.is_some(),
        "resolved labels"
    );

    let resolution = Resolution {
        sections,
        entry,
        terminal,
    };
    check_targets(&resolution)?;
    Ok(resolution)
}

/// Point every choice at the label of the next section, or at the
/// terminal label for choices in the last section.
fn link_choices(
    sections: &mut [LabeledSection],
    terminal: Option<&Label>,
) -> Result<(), ConvertError> {
    let followers: Vec<Option<Label>> = (0..sections.len())
        .map(|i| match sections.get(i + 1) {
            Some(next) => next.label.clone(),
            None => terminal.cloned(),
        })
        .collect();

    for (section, target) in sections.iter_mut().zip(followers) {
        let section_name = section_name(section);
        for block in section.body.iter_mut() {
            let ScriptBlock::Menu(menu) = block else {
                continue;
            };
            for choice in menu.choices.iter_mut() {
                match &target {
                    Some(label) => choice.target = Some(label.clone()),
                    None => {
                        return Err(ConvertError::UnresolvedJump {
                            section: section_name,
                            choice: plain_text(&choice.runs),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Every jump must land on a section label or the terminal label.
fn check_targets(resolution: &Resolution) -> Result<(), ConvertError> {
    let known: HashSet<&Label> = resolution
        .sections
        .iter()
        .filter_map(|s| s.label.as_ref())
        .chain(resolution.terminal.as_ref())
        .collect();

    for section in &resolution.sections {
        for menu in section.menus() {
            for choice in &menu.choices {
                let resolved = choice.target.as_ref().is_some_and(|t| known.contains(t));
                if !resolved {
                    return Err(ConvertError::UnresolvedJump {
                        section: section_name(section),
                        choice: plain_text(&choice.runs),
                    });
                }
            }
        }
    }
    Ok(())
}

fn section_name(section: &LabeledSection) -> String {
    match (&section.label, &section.origin) {
        (Some(label), _) => label.to_string(),
        (None, SectionOrigin::Heading { title, .. }) => title.clone(),
        (None, SectionOrigin::Implicit) => "(start)".to_string(),
    }
}
