/// Core domain errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid late-fee policy: {0}")]
    InvalidPolicy(String),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("unknown subject type: {0}")]
    UnknownSubjectType(String),

    #[error("amount overflow")]
    Overflow,
}
