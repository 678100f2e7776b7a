//! Immutable rectangular grids of scalars and the elementwise and linear
//! operations on them. Determinant, eigen, and power live in sibling
//! modules as further `impl Matrix` blocks.
use std::fmt;

use nalgebra::DMatrix;
use num_complex::Complex64 as C64;
use serde::{Deserialize, Serialize};

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::scalar::Scalar;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Scalar>>", into = "Vec<Vec<Scalar>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<Scalar>>,
}

impl Matrix {
    /// Validates that the grid is non-empty and rectangular.
    pub fn new(data: Vec<Vec<Scalar>>) -> MatrixResult<Self> {
        let rows = data.len();
        if rows == 0 {
            return Err(MatrixError::shape("matrix must have at least one row"));
        }
        let cols = data[0].len();
        if cols == 0 {
            return Err(MatrixError::shape("matrix must have at least one column"));
        }
        if let Some(i) = data.iter().position(|r| r.len() != cols) {
            return Err(MatrixError::Shape(format!(
                "row {} has {} elements, expected {}",
                i + 1,
                data[i].len(),
                cols
            )));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Parses every token through `Scalar::parse`.
    pub fn parse<S: AsRef<str>>(grid: &[Vec<S>]) -> MatrixResult<Self> {
        let data = grid
            .iter()
            .map(|row| row.iter().map(|t| Scalar::parse(t.as_ref())).collect::<MatrixResult<Vec<_>>>())
            .collect::<MatrixResult<Vec<_>>>()?;
        Matrix::new(data)
    }

    pub fn from_grid<T: Clone + Into<Scalar>>(grid: &[Vec<T>]) -> MatrixResult<Self> {
        Matrix::new(grid.iter().map(|row| row.iter().cloned().map(Into::into).collect()).collect())
    }

    /// Unchecked constructor for grids built by the engine itself.
    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<Vec<Scalar>>) -> Self {
        debug_assert!(data.len() == rows && data.iter().all(|r| r.len() == cols));
        Matrix { rows, cols, data }
    }

    pub(crate) fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> Scalar) -> Self {
        let data = (0..rows).map(|i| (0..cols).map(|j| f(i, j)).collect()).collect();
        Matrix::from_parts(rows, cols, data)
    }

    pub fn identity(n: usize) -> Self {
        Matrix::from_fn(n, n, |i, j| if i == j { Scalar::one() } else { Scalar::zero() })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix::from_fn(rows, cols, |_, _| Scalar::zero())
    }

    pub fn diagonal(values: &[Scalar]) -> Self {
        let n = values.len();
        Matrix::from_fn(n, n, |i, j| if i == j { values[i].clone() } else { Scalar::zero() })
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.cols) }
    pub fn is_square(&self) -> bool { self.rows == self.cols }
    pub fn data(&self) -> &[Vec<Scalar>] { &self.data }
    pub fn get(&self, i: usize, j: usize) -> Option<&Scalar> { self.data.get(i)?.get(j) }
    pub fn row(&self, i: usize) -> Option<&[Scalar]> { self.data.get(i).map(Vec::as_slice) }

    pub fn elements(&self) -> impl Iterator<Item = &Scalar> {
        self.data.iter().flatten()
    }

    pub fn is_exact(&self) -> bool {
        self.elements().all(Scalar::is_exact)
    }

    /// Contains floating values and no symbolic ones: the elimination path applies.
    pub fn is_numeric(&self) -> bool {
        self.elements().any(Scalar::is_numeric) && !self.elements().any(Scalar::is_symbolic)
    }

    pub(crate) fn require_square(&self, op: &str) -> MatrixResult<()> {
        if self.is_square() {
            Ok(())
        } else {
            Err(MatrixError::not_square(op))
        }
    }

    fn require_same_shape(&self, other: &Matrix, op: &str) -> MatrixResult<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch(format!(
                "cannot {op} {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )))
        }
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(&Scalar, &Scalar) -> Scalar) -> Matrix {
        Matrix::from_fn(self.rows, self.cols, |i, j| f(&self.data[i][j], &other.data[i][j]))
    }

    pub fn map(&self, f: impl Fn(&Scalar) -> Scalar) -> Matrix {
        Matrix::from_fn(self.rows, self.cols, |i, j| f(&self.data[i][j]))
    }

    pub fn add(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.require_same_shape(other, "add")?;
        Ok(self.zip_with(other, Scalar::add))
    }

    pub fn subtract(&self, other: &Matrix) -> MatrixResult<Matrix> {
        self.require_same_shape(other, "subtract")?;
        Ok(self.zip_with(other, Scalar::sub))
    }

    /// Each entry accumulates `A[i][k] * B[k][j]` for increasing `k`.
    pub fn multiply(&self, other: &Matrix) -> MatrixResult<Matrix> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(Matrix::from_fn(self.rows, other.cols, |i, j| {
            (0..self.cols).fold(Scalar::zero(), |acc, k| acc.add(&self.data[i][k].mul(&other.data[k][j])))
        }))
    }

    pub fn scalar_multiply(&self, s: &Scalar) -> Matrix {
        self.map(|x| x.mul(s))
    }

    pub fn transpose(&self) -> Matrix {
        Matrix::from_fn(self.cols, self.rows, |i, j| self.data[j][i].clone())
    }

    pub fn trace(&self) -> MatrixResult<Scalar> {
        self.require_square("trace")?;
        Ok((0..self.rows).fold(Scalar::zero(), |acc, i| acc.add(&self.data[i][i])))
    }

    /// Elementwise numeric approximation.
    pub fn evaluate(&self) -> MatrixResult<Matrix> {
        let data = self
            .data
            .iter()
            .map(|row| row.iter().map(Scalar::evaluate).collect::<MatrixResult<Vec<_>>>())
            .collect::<MatrixResult<Vec<_>>>()?;
        Ok(Matrix::from_parts(self.rows, self.cols, data))
    }

    pub fn to_f64_grid(&self) -> MatrixResult<Vec<Vec<f64>>> {
        self.data
            .iter()
            .map(|row| row.iter().map(Scalar::to_f64).collect())
            .collect()
    }

    pub(crate) fn to_dmatrix(&self) -> MatrixResult<DMatrix<C64>> {
        let mut out = DMatrix::<C64>::zeros(self.rows, self.cols);
        for (i, row) in self.data.iter().enumerate() {
            for (j, x) in row.iter().enumerate() {
                out[(i, j)] = x.to_complex()?;
            }
        }
        Ok(out)
    }

    pub(crate) fn from_dmatrix(m: &DMatrix<C64>) -> Matrix {
        Matrix::from_fn(m.nrows(), m.ncols(), |i, j| Scalar::from_complex(m[(i, j)]))
    }

    /// Same shape and every pair of entries `Scalar::approx_eq`.
    pub fn approx_eq(&self, other: &Matrix) -> bool {
        self.shape() == other.shape()
            && self.elements().zip(other.elements()).all(|(a, b)| a.approx_eq(b))
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_square() && self.approx_eq(&self.transpose())
    }

    /// `A * Aᵀ == I`.
    pub fn is_orthogonal(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        match self.multiply(&self.transpose()) {
            Ok(product) => product.approx_eq(&Matrix::identity(self.rows)),
            Err(_) => false,
        }
    }
}

impl TryFrom<Vec<Vec<Scalar>>> for Matrix {
    type Error = MatrixError;

    fn try_from(data: Vec<Vec<Scalar>>) -> Result<Self, Self::Error> {
        Matrix::new(data)
    }
}

impl From<Matrix> for Vec<Vec<Scalar>> {
    fn from(m: Matrix) -> Self {
        m.data
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(j, x)| format!("a{}{} = {}", i + 1, j + 1, x))
                .collect();
            f.write_str(&cells.join("  "))?;
        }
        Ok(())
    }
}
