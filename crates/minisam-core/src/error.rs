use crate::Key;

/// Errors when building keys.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The index does not fit in the 56 low bits of a key.
    #[error("Key index {0} does not fit in 56 bits")]
    IndexOverflow(u64),

    /// The key character is not ASCII.
    #[error("Key character {0:?} is not ASCII")]
    NonAsciiChar(char),
}

/// Errors raised by [`crate::Variables`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VariableError {
    #[error("Variable {0} already exists")]
    KeyExists(String),

    #[error("Variable {0} not found")]
    KeyNotFound(String),

    /// The stored variable has a different type than the requested one.
    #[error("Variable {key} holds a {found}, expected a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl VariableError {
    pub(crate) fn key_exists(key: Key) -> Self {
        Self::KeyExists(crate::key_string(key))
    }

    pub(crate) fn key_not_found(key: Key) -> Self {
        Self::KeyNotFound(crate::key_string(key))
    }
}

/// Errors raised when building or applying a loss function.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LossError {
    /// A scale, sigma or robust kernel width is zero or negative.
    #[error("Parameter {0} must be positive, got {1}")]
    NonPositiveParameter(&'static str, f64),

    /// The residual or matrix size does not match the loss dimension.
    #[error("Dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Matrix is not symmetric positive definite")]
    NotPositiveDefinite,
}

/// Errors raised by timers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Timer {0} was stopped without being started")]
    NotStarted(String),
}
