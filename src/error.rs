use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("unsupported {context}: '{value}'")]
    UnsupportedSelector {
        context: &'static str,
        value: String,
    },
    #[error("speech synthesis failed while {context}: {message}")]
    Synthesis {
        context: &'static str,
        message: String,
    },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(context: &'static str, value: impl Into<String>) -> Self {
        Self::UnsupportedSelector {
            context,
            value: value.into(),
        }
    }

    /// For `SpeechSynthesizer` implementations reporting an engine failure.
    pub fn synthesis(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Synthesis {
            context,
            message: err.to_string(),
        }
    }
}
