//! Domain error types.

/// Top-level error type for stockdigest.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("quote unavailable for {symbol}: {reason}")]
    QuoteUnavailable { symbol: String, reason: String },

    #[error("notification via {sink} failed: {reason}")]
    NotificationFailed { sink: String, reason: String },

    #[error("reference price store {path}: {reason}")]
    Store { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DigestError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        DigestError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        DigestError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }
}

impl From<&DigestError> for std::process::ExitCode {
    fn from(err: &DigestError) -> Self {
        let code: u8 = match err {
            DigestError::Io(_) | DigestError::Store { .. } => 1,
            DigestError::ConfigParse { .. }
            | DigestError::ConfigMissing { .. }
            | DigestError::ConfigInvalid { .. } => 2,
            DigestError::QuoteUnavailable { .. } | DigestError::NotificationFailed { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
