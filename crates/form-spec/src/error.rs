use thiserror::Error;

/// Schema authoring problems detected while compiling validators.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("field '{field}': invalid {rule} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: String,
        rule: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("field '{field}': invalid fileType pattern '{pattern}': {source}")]
    InvalidFileType {
        field: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("field '{field}': invalid {rule} message template: {source}")]
    InvalidMessage {
        field: String,
        rule: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },
    #[error("field name '{name}' is declared by both '{first}' and '{second}'")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}

/// Failure reported by a host-supplied validation source.
#[derive(Debug, Error)]
#[error("external validation failed: {message}")]
pub struct ExternalValidationError {
    pub message: String,
}

impl ExternalValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
