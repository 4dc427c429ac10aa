use manuscript::Document;

use crate::aggregate::aggregate;
use crate::classify::{StyleClassifier, classify_document};
use crate::config::Config;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::emit::emit;
use crate::error::ConvertError;
use crate::resolve::resolve;
use crate::speaker::SpeakerParser;

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// Complete script text, ending in a single newline.
    pub script: String,
    /// Warnings gathered along the way, in pipeline order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Conversion {
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_warning)
    }
}

/// A configured conversion pipeline.
///
/// Holds only compiled policy; every call to [`Converter::convert`] builds
/// its own intermediate state, so one converter can be shared freely.
#[derive(Debug)]
pub struct Converter {
    config: Config,
    classifier: StyleClassifier,
    speakers: SpeakerParser,
}

impl Converter {
    pub fn new(config: Config) -> Result<Self, ConvertError> {
        config.script.validate()?;
        let classifier = StyleClassifier::new(&config.rules)?;
        let speakers = SpeakerParser::new(&config.speaker);
        Ok(Converter {
            config,
            classifier,
            speakers,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn convert(&self, document: &Document) -> Result<Conversion, ConvertError> {
        let span = tracing::debug_span!("convert", blocks = document.len());
        let _enter = span.enter();

        if document.is_empty() {
            return Err(ConvertError::EmptyDocument);
        }

        let mut diagnostics = Diagnostics::new();

        let classified =
            classify_document(document, &self.classifier, &self.speakers, &mut diagnostics);
        if classified.is_empty() {
            return Err(ConvertError::EmptyDocument);
        }
        tracing::debug!(classified = classified.len(), "classified blocks");

        let sections = aggregate(&classified, &self.speakers, &mut diagnostics);
        tracing::debug!(sections = sections.len(), "aggregated sections");

        let resolution = resolve(sections, &self.config.script, &mut diagnostics)?;
        let script = emit(&resolution, &self.config.script)?;

        tracing::debug!(
            bytes = script.len(),
            warnings = diagnostics.len(),
            "emitted script"
        );
        Ok(Conversion {
            script,
            diagnostics: diagnostics.into_vec(),
        })
    }
}

/// Convert `document` with the default configuration.
pub fn convert(document: &Document) -> Result<Conversion, ConvertError> {
    Converter::new(Config::default())?.convert(document)
}
