pub mod aggregate;
pub mod classify;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod engine;
pub mod error;
pub mod markup;
pub mod resolve;
pub mod speaker;

pub use classify::BlockKind;
pub use config::{Config, ScriptConfig, SpeakerConfig, StyleRule};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use engine::{Conversion, Converter, convert};
pub use error::ConvertError;
pub use resolve::Label;
