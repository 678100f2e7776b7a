//! matrixcalc: exact, symbolic, and floating matrix algebra.
//!
//! The engine lives under [`core`]; [`config`] and [`io`] serve the
//! `matrixcalc` binary and the named-matrix registry.
pub mod config;
pub mod core;
pub mod io;

pub use crate::core::{Matrix, MatrixError, MatrixResult, Polynomial, Scalar};
