//! Matrix algebra engine: scalar model, matrices, and the operations on them.
//! Only declare modules that exist in the src/core/ directory.

#[macro_use]
pub mod debug; // gated debug logging (MATRIXCALC_DEBUG=1) provides debug_log! macro
pub mod error;
pub mod expr;
pub mod parser;
pub mod scalar;
pub mod ring;
pub mod polynomial;
pub mod numeric;
pub mod matrix;
pub mod determinant;
pub mod eigen;
pub mod power;
pub mod calculate;
pub mod registry;

pub use calculate::{calculate, check_property, Operation, Outcome, Property, Request};
pub use eigen::Diagonalization;
pub use error::{MatrixError, MatrixResult};
pub use matrix::Matrix;
pub use polynomial::Polynomial;
pub use power::PowerStrategy;
pub use scalar::Scalar;
