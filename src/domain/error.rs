//! Domain error types.

/// Top-level error type for portvis.
#[derive(Debug, thiserror::Error)]
pub enum PortvisError {
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

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {symbols} between {start} and {end}")]
    NoData {
        symbols: String,
        start: String,
        end: String,
    },

    #[error("shape mismatch: {weights} weights for {assets} assets")]
    ShapeMismatch { weights: usize, assets: usize },

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PortvisError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PortvisError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

impl From<&PortvisError> for std::process::ExitCode {
    fn from(err: &PortvisError) -> Self {
        let code: u8 = match err {
            PortvisError::Io(_) | PortvisError::Csv(_) => 1,
            PortvisError::ConfigParse { .. }
            | PortvisError::ConfigMissing { .. }
            | PortvisError::ConfigInvalid { .. } => 2,
            PortvisError::Data { .. } => 3,
            PortvisError::ShapeMismatch { .. } | PortvisError::InvalidArgument { .. } => 4,
            PortvisError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
