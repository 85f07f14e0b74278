use std::path::PathBuf;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid JSON format while parsing {context}: missing `{field}`")]
    MissingField {
        context: String,
        field: &'static str,
    },

    #[error("Invalid payload for {context}: {message}")]
    InvalidPayload { context: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Shared(Arc<Error>),
}

impl Error {
    pub(crate) fn missing(context: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            context: context.into(),
            field,
        }
    }
}
