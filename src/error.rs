use thiserror::Error;

/// Error types for the lmmc-rs library.
#[derive(Error, Debug)]
pub enum LmmcError {
    /// Error for an invalid run or fitter configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Error indicating a mismatch in vector or matrix dimensions.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// No Monte Carlo repetition produced an acceptable fit.
    #[error("No successful fits out of {attempted} repetitions")]
    NoSuccessfulFits { attempted: usize },

    /// The requested model is not registered.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Parameter not found.
    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    /// I/O error wrapper.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LmmcError {
    /// Returns true for errors detected before any fit is attempted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LmmcError::InvalidConfiguration(_)
                | LmmcError::DimensionMismatch(_)
                | LmmcError::UnknownModel(_)
                | LmmcError::ParameterNotFound(_)
        )
    }
}

/// Result type alias for lmmc-rs operations.
pub type Result<T> = std::result::Result<T, LmmcError>;
