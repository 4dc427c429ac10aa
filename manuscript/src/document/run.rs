use std::fmt;

/// Inline formatting flags carried by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Formatting {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl Formatting {
    pub const PLAIN: Formatting = Formatting {
        bold: false,
        italic: false,
        underline: false,
        strikethrough: false,
    };

    pub fn bold() -> Self {
        Formatting { bold: true, ..Self::PLAIN }
    }

    pub fn italic() -> Self {
        Formatting { italic: true, ..Self::PLAIN }
    }

    pub fn underline() -> Self {
        Formatting { underline: true, ..Self::PLAIN }
    }

    pub fn strikethrough() -> Self {
        Formatting { strikethrough: true, ..Self::PLAIN }
    }

    pub fn and(self, other: Formatting) -> Self {
        Formatting {
            bold: self.bold || other.bold,
            italic: self.italic || other.italic,
            underline: self.underline || other.underline,
            strikethrough: self.strikethrough || other.strikethrough,
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::PLAIN
    }
}

/// A contiguous span of text sharing one set of formatting flags.
/// Adjacent runs with identical formatting are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub format: Formatting,
}

impl Run {
    pub fn new(text: impl Into<String>, format: Formatting) -> Self {
        Run {
            text: text.into(),
            format,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Run::new(text, Formatting::PLAIN)
    }
}

impl fmt::Display for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut markers = String::new();
        if self.format.bold {
            markers.push_str("**");
        }
        if self.format.italic {
            markers.push('*');
        }
        if self.format.strikethrough {
            markers.push_str("~~");
        }
        if self.format.underline {
            write!(f, "<u>")?;
        }
        write!(f, "{}{}", markers, self.text)?;
        write!(f, "{}", markers.chars().rev().collect::<String>())?;
        if self.format.underline {
            write!(f, "</u>")?;
        }
        Ok(())
    }
}
