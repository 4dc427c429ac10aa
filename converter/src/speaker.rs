use crate::config::SpeakerConfig;

/// Characters that end a sentence. A speaker separator has to come before
/// any of these.
const SENTENCE_END: &[char] = &['.', '!', '?', '…', '。', '！', '？'];

/// Outcome of looking for a "Name: text" split in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerSplit {
    /// `name` speaks; the spoken text starts at byte `body`.
    Speaker { name: String, body: usize },
    /// No usable separator (or an empty name before it). The spoken text
    /// starts at byte `body`.
    NoSpeaker { body: usize },
    /// A separator was found, but the text before it does not look like a
    /// name. The whole line is spoken text.
    Ambiguous { prefix: String },
}

impl SpeakerSplit {
    pub fn is_speaker(&self) -> bool {
        matches!(self, SpeakerSplit::Speaker { .. })
    }
}

/// Splits dialogue lines into speaker name and spoken text.
#[derive(Debug, Clone)]
pub struct SpeakerParser {
    separators: Vec<char>,
    max_words: usize,
}

impl SpeakerParser {
    pub fn new(config: &SpeakerConfig) -> Self {
        SpeakerParser {
            separators: config.separators.clone(),
            max_words: config.max_words,
        }
    }

    /// Find the first unescaped separator before the first sentence end.
    ///
    /// A separator only counts when followed by whitespace or the end of
    /// the line, so times ("10:30") and URLs are left alone.
    pub fn split(&self, text: &str) -> SpeakerSplit {
        let mut escaped = false;
        let mut chars = text.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
                continue;
            }
            if self.separators.contains(&ch) {
                let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
                if !at_boundary {
                    continue;
                }
                let prefix = text[..i].trim();
                let body = i + ch.len_utf8();
                if prefix.is_empty() {
                    return SpeakerSplit::NoSpeaker { body };
                }
                if self.is_name_like(prefix) {
                    return SpeakerSplit::Speaker {
                        name: prefix.to_string(),
                        body,
                    };
                }
                return SpeakerSplit::Ambiguous {
                    prefix: prefix.to_string(),
                };
            }
            if SENTENCE_END.contains(&ch) {
                break;
            }
        }

        SpeakerSplit::NoSpeaker { body: 0 }
    }

    /// A name is a few words, contains a letter, and carries no trailing
    /// punctuation (a closing parenthesis is fine: "Bob (quietly)").
    fn is_name_like(&self, prefix: &str) -> bool {
        let words = prefix.split_whitespace().count();
        let ends_cleanly = prefix
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == ')');
        words <= self.max_words && ends_cleanly && prefix.chars().any(char::is_alphabetic)
    }
}
