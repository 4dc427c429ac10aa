use serde::Deserialize;

use crate::classify::BlockKind;
use crate::error::ConvertError;
use crate::resolve::is_valid_label;

/// Conversion policy. Every field has a default, so a TOML file only needs
/// to name what it changes.
///
/// ```toml
/// [[rules]]
/// style = "^scene note$"
/// kind = "stage_direction"
///
/// [speaker]
/// max_words = 2
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Ordered style rules; the first matching rule wins. A table given in
    /// configuration replaces the defaults entirely.
    pub rules: Vec<StyleRule>,
    pub speaker: SpeakerConfig,
    pub script: ScriptConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rules: default_rules(),
            speaker: SpeakerConfig::default(),
            script: ScriptConfig::default(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Config, ConvertError> {
        Ok(toml::from_str(source)?)
    }
}

/// Maps style names matching `style` (a case-insensitive regex, tested
/// against the trimmed style name) to a block kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleRule {
    pub style: String,
    pub kind: BlockKind,
    /// When set, a "Name:" prefix in the content overrides `kind` with
    /// dialogue.
    #[serde(default)]
    pub dialogue_like: bool,
}

impl StyleRule {
    pub fn new(style: impl Into<String>, kind: BlockKind) -> Self {
        StyleRule {
            style: style.into(),
            kind,
            dialogue_like: false,
        }
    }

    pub fn dialogue_like(mut self) -> Self {
        self.dialogue_like = true;
        self
    }
}

pub fn default_rules() -> Vec<StyleRule> {
    vec![
        StyleRule::new(r"^(title|subtitle|heading\s*\d*)$", BlockKind::Heading),
        StyleRule::new(
            r"^(choice|menu|option|list bullet\s*\d*|list number\s*\d*)$",
            BlockKind::Choice,
        ),
        StyleRule::new(
            r"^(stage direction|direction|action|quote|intense quote|code)$",
            BlockKind::StageDirection,
        ),
        StyleRule::new(r"^(dialogue|dialog|speech|character)$", BlockKind::Dialogue),
        StyleRule::new(r"^(narration|narrative|description)$", BlockKind::Narration),
        StyleRule::new(
            r"^(normal|body text|default paragraph style|list paragraph|plain text)$",
            BlockKind::Narration,
        )
        .dialogue_like(),
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpeakerConfig {
    /// Characters separating a speaker name from the spoken text.
    pub separators: Vec<char>,
    /// Longest speaker name, in words.
    pub max_words: usize,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        SpeakerConfig {
            separators: vec![':'],
            max_words: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptConfig {
    /// Spaces per indentation level.
    pub indent: usize,
    /// Label the runtime starts at.
    pub entry_label: String,
    /// Label synthesized for choices with no following section.
    pub terminal_label: String,
    /// Base label for headings that slugify to nothing.
    pub fallback_label: String,
    /// Stage direction lines whose first word is listed here are emitted
    /// as script statements instead of comments. Lines that read like
    /// prose stay comments whatever their first word.
    pub passthrough: Vec<String>,
}

impl ScriptConfig {
    /// Reject settings that would produce a script the runtime cannot load.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.indent == 0 {
            return Err(ConvertError::InvalidOption {
                option: "indent",
                reason: "must be at least 1".to_string(),
            });
        }
        let labels = [
            ("entry_label", &self.entry_label),
            ("terminal_label", &self.terminal_label),
            ("fallback_label", &self.fallback_label),
        ];
        for (option, name) in labels {
            if !is_valid_label(name) {
                return Err(ConvertError::InvalidOption {
                    option,
                    reason: format!("'{}' is not a usable label name", name),
                });
            }
        }
        if let Some(keyword) = self
            .passthrough
            .iter()
            .find(|k| k.is_empty() || k.contains(char::is_whitespace))
        {
            return Err(ConvertError::InvalidOption {
                option: "passthrough",
                reason: format!("'{}' is not a single keyword", keyword),
            });
        }
        Ok(())
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            indent: 4,
            entry_label: "start".to_string(),
            terminal_label: "end".to_string(),
            fallback_label: "section".to_string(),
            passthrough: ["scene", "show", "play", "$"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}
