use thiserror::Error;
use tiletables::CompressionError;

/// Failure of one generation call. Generation is pure and one-shot:
/// nothing is retried and nothing partial is ever returned.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Incompatible or degenerate option combination, detected before any
    /// points are generated.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The external compression engine failed; the whole call aborts.
    #[error(transparent)]
    Compression(#[from] CompressionError),
}
