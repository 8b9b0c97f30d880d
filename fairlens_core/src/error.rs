/// Failures of the verification derivations.
///
/// All of them are deterministic: the same malformed input always fails the
/// same way, so callers surface the message and never retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("invalid length: expected at least {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("crypto provider error: {0}")]
    CryptoProvider(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
