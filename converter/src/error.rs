use thiserror::Error;

/// Structural failures that abort a conversion. No script text is produced
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("document is empty: nothing to convert")]
    EmptyDocument,

    #[error("choice '{choice}' in section '{section}' has no jump target")]
    UnresolvedJump { section: String, choice: String },

    #[error("invalid style pattern '{pattern}': {source}")]
    InvalidRule {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid script option '{option}': {reason}")]
    InvalidOption { option: &'static str, reason: String },

    /// A section or choice reached the emitter without a label.
    #[error("script could not be rendered: unresolved label")]
    Render,
}
