use thiserror::Error;

/// Every failure the engine can report. Operations return the first error
/// they detect and never fall back to a degraded result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("Shape Error: {0}")]
    Shape(String),
    #[error("Invalid Scalar: {0}")]
    InvalidScalar(String),
    #[error("Dimension Mismatch: {0}")]
    DimensionMismatch(String),
    #[error("Not Square: {0}")]
    NotSquare(String),
    #[error("Singular Matrix: {0}")]
    Singular(String),
    #[error("Division By Zero: {0}")]
    DivisionByZero(String),
    #[error("Undefined Power: {0}")]
    UndefinedPower(String),
    #[error("Non-numeric Value: {0}")]
    NonNumeric(String),
    #[error("Unknown Operation: {0}")]
    UnknownOperation(String),
    #[error("Unknown Property: {0}")]
    UnknownProperty(String),
    #[error("Missing Operand: {0}")]
    MissingOperand(String),
}

pub type MatrixResult<T> = Result<T, MatrixError>;

impl MatrixError {
    pub fn shape(message: &str) -> Self { MatrixError::Shape(message.to_string()) }
    pub fn invalid_scalar(token: &str) -> Self { MatrixError::InvalidScalar(token.to_string()) }
    pub fn dimension_mismatch(message: &str) -> Self { MatrixError::DimensionMismatch(message.to_string()) }
    pub fn not_square(op: &str) -> Self {
        MatrixError::NotSquare(format!("{op} requires a square matrix"))
    }
    pub fn singular(message: &str) -> Self { MatrixError::Singular(message.to_string()) }
    pub fn division_by_zero() -> Self { MatrixError::DivisionByZero("divisor is exactly zero".to_string()) }
    pub fn undefined_power(message: &str) -> Self { MatrixError::UndefinedPower(message.to_string()) }
    pub fn non_numeric(expr: &str) -> Self { MatrixError::NonNumeric(expr.to_string()) }
}
