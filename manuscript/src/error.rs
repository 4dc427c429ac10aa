use thiserror::Error;

/// Failures while turning document bytes into a [`crate::Document`].
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("not a valid docx container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("missing part '{0}' in docx container")]
    MissingPart(String),

    #[error("malformed XML in '{part}': {source}")]
    Xml {
        part: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("manuscript is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    pub(crate) fn xml(part: &str, source: quick_xml::Error) -> Self {
        ReadError::Xml {
            part: part.to_string(),
            source,
        }
    }
}
