use thiserror::Error;

/// Errors raised by fixed-point arithmetic and the filter recursions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// A fixed-point operation left the representable range
    #[error("Arithmetic overflow in fixed-point {op}")]
    ArithmeticOverflow { op: &'static str },

    /// A denominator in a filter recursion evaluated to zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Construction-time rejection of noise parameters or smoothing weight
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Decimal text that does not describe a fixed-point value
    #[error("Invalid fixed-point literal: {0}")]
    InvalidLiteral(String),
}

impl FilterError {
    pub(crate) fn overflow(op: &'static str) -> Self {
        FilterError::ArithmeticOverflow { op }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        FilterError::InvalidConfiguration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
