//! Determinant, minors, cofactors, and the inverse.
//!
//! Exact and symbolic matrices go through cofactor (Laplace) expansion so
//! no rounding is ever introduced. Matrices holding floating values use
//! partial-pivot elimination instead.
use num_complex::Complex64 as C64;

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::matrix::Matrix;
use crate::core::ring::{laplace_determinant, minor};
use crate::core::scalar::Scalar;

/// Pivot threshold relative to the largest entry: `n * eps * max|a_ij|`.
fn pivot_tolerance(rows: &[Vec<C64>]) -> f64 {
    let scale = rows.iter().flatten().map(|z| z.norm()).fold(0.0, f64::max);
    rows.len() as f64 * f64::EPSILON * scale
}

/// Determinant by row reduction with partial pivoting. A pivot column with
/// no entry above `pivot_tolerance` makes the determinant zero.
fn eliminate_determinant(mut rows: Vec<Vec<C64>>) -> Scalar {
    let n = rows.len();
    let tol = pivot_tolerance(&rows);
    let mut det = C64::new(1.0, 0.0);
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| rows[a][col].norm().total_cmp(&rows[b][col].norm()))
            .unwrap_or(col);
        if rows[pivot][col].norm() <= tol {
            return Scalar::Approx(0.0);
        }
        if pivot != col {
            rows.swap(pivot, col);
            det = -det;
        }
        let p = rows[col][col];
        det *= p;
        for r in (col + 1)..n {
            let factor = rows[r][col] / p;
            for c in col..n {
                let delta = factor * rows[col][c];
                rows[r][c] -= delta;
            }
        }
    }
    Scalar::from_complex(det)
}

/// Gauss-Jordan on `[A | I]`; a numerically zero pivot is `Singular`.
fn gauss_jordan_inverse(matrix: &[Vec<C64>]) -> MatrixResult<Vec<Vec<C64>>> {
    let n = matrix.len();
    let tol = pivot_tolerance(matrix);
    let zero = C64::new(0.0, 0.0);
    let one = C64::new(1.0, 0.0);
    let mut augmented: Vec<Vec<C64>> = matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut extended = row.clone();
            extended.extend((0..n).map(|j| if i == j { one } else { zero }));
            extended
        })
        .collect();

    for i in 0..n {
        let pivot_row = (i..n)
            .max_by(|&a, &b| augmented[a][i].norm().total_cmp(&augmented[b][i].norm()))
            .unwrap_or(i);
        if augmented[pivot_row][i].norm() <= tol {
            return Err(MatrixError::singular("zero pivot during elimination"));
        }
        augmented.swap(i, pivot_row);

        let pivot = augmented[i][i];
        for j in 0..2 * n {
            augmented[i][j] /= pivot;
        }
        for k in 0..n {
            if k != i {
                let factor = augmented[k][i];
                for j in 0..2 * n {
                    let delta = factor * augmented[i][j];
                    augmented[k][j] -= delta;
                }
            }
        }
    }
    Ok(augmented.iter().map(|row| row[n..2 * n].to_vec()).collect())
}

fn complex_rows(m: &Matrix) -> MatrixResult<Vec<Vec<C64>>> {
    m.data()
        .iter()
        .map(|row| row.iter().map(Scalar::to_complex).collect())
        .collect()
}

impl Matrix {
    /// The matrix with row `i` and column `j` removed.
    pub fn submatrix(&self, i: usize, j: usize) -> MatrixResult<Matrix> {
        if i >= self.rows() || j >= self.cols() {
            return Err(MatrixError::Shape(format!(
                "index ({i}, {j}) out of range for a {}x{} matrix",
                self.rows(),
                self.cols()
            )));
        }
        if self.rows() == 1 || self.cols() == 1 {
            return Err(MatrixError::shape("submatrix would be empty"));
        }
        Ok(Matrix::from_parts(
            self.rows() - 1,
            self.cols() - 1,
            minor(self.data(), i, j),
        ))
    }

    pub fn determinant(&self) -> MatrixResult<Scalar> {
        self.require_square("determinant")?;
        if self.rows() > 2 && self.is_numeric() {
            debug_log!("determinant: elimination path for {}x{}", self.rows(), self.cols());
            return Ok(eliminate_determinant(complex_rows(self)?));
        }
        Ok(laplace_determinant(self.data()))
    }

    /// `C[i][j] = (-1)^(i+j) det(submatrix(i, j))`.
    pub fn cofactor_matrix(&self) -> MatrixResult<Matrix> {
        self.require_square("cofactor matrix")?;
        let n = self.rows();
        if n == 1 {
            return Ok(Matrix::identity(1));
        }
        let mut data = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::with_capacity(n);
            for j in 0..n {
                let sub_det = self.submatrix(i, j)?.determinant()?;
                row.push(if (i + j) % 2 == 0 { sub_det } else { sub_det.neg() });
            }
            data.push(row);
        }
        Ok(Matrix::from_parts(n, n, data))
    }

    pub fn adjugate(&self) -> MatrixResult<Matrix> {
        Ok(self.cofactor_matrix()?.transpose())
    }

    pub fn inverse(&self) -> MatrixResult<Matrix> {
        self.require_square("inverse")?;
        let n = self.rows();
        if self.is_numeric() {
            debug_log!("inverse: Gauss-Jordan for {}x{}", n, n);
            let inv = gauss_jordan_inverse(&complex_rows(self)?)?;
            return Ok(Matrix::from_fn(n, n, |i, j| Scalar::from_complex(inv[i][j])));
        }

        let det = self.determinant()?;
        if det.is_zero() {
            return Err(MatrixError::singular("determinant is zero"));
        }
        let a = self.data();
        match n {
            1 => Ok(Matrix::from_parts(1, 1, vec![vec![a[0][0].recip()?]])),
            2 => {
                let grid = vec![
                    vec![a[1][1].div(&det)?, a[0][1].neg().div(&det)?],
                    vec![a[1][0].neg().div(&det)?, a[0][0].div(&det)?],
                ];
                Ok(Matrix::from_parts(2, 2, grid))
            }
            _ => {
                let adj = self.adjugate()?;
                let data = adj
                    .data()
                    .iter()
                    .map(|row| row.iter().map(|x| x.div(&det)).collect::<MatrixResult<Vec<_>>>())
                    .collect::<MatrixResult<Vec<_>>>()?;
                Ok(Matrix::from_parts(n, n, data))
            }
        }
    }

    /// `det != 0`; false for non-square input or when the determinant cannot
    /// be computed. Floating matrices use the same pivot test as `inverse`.
    pub fn is_invertible(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        if self.is_numeric() {
            return complex_rows(self).is_ok_and(|rows| gauss_jordan_inverse(&rows).is_ok());
        }
        self.determinant().map(|d| !d.is_zero()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(grid: &[&[i64]]) -> Matrix {
        Matrix::from_grid(&grid.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn two_by_two_determinant_and_inverse() {
        let a = m(&[&[1, 2], &[3, 4]]);
        assert_eq!(a.determinant().unwrap(), Scalar::integer(-2));
        let inv = a.inverse().unwrap();
        let expected = Matrix::parse(&[vec!["-2", "1"], vec!["3/2", "-1/2"]]).unwrap();
        assert_eq!(inv, expected);
    }

    #[test]
    fn closed_form_matches_cofactor_path() {
        let a = m(&[&[5, 7], &[2, 3]]);
        let det = a.determinant().unwrap();
        let via_adjugate = a.adjugate().unwrap().map(|x| x.div(&det).unwrap());
        assert_eq!(a.inverse().unwrap(), via_adjugate);
    }

    #[test]
    fn laplace_and_elimination_agree() {
        let exact = m(&[&[2, -1, 0], &[-1, 2, -1], &[0, -1, 2]]);
        let floats = exact.evaluate().unwrap();
        assert_eq!(exact.determinant().unwrap(), Scalar::integer(4));
        assert!(floats.determinant().unwrap().approx_eq(&Scalar::integer(4)));
    }

    #[test]
    fn singular_inputs() {
        assert!(matches!(m(&[&[1, 2], &[2, 4]]).inverse(), Err(MatrixError::Singular(_))));
        let floats = m(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]).evaluate().unwrap();
        assert!(matches!(floats.inverse(), Err(MatrixError::Singular(_))));
        assert!(floats.determinant().unwrap().is_zero());
        assert!(!floats.is_invertible());
    }

    #[test]
    fn pivot_threshold_follows_matrix_scale() {
        let tiny = Matrix::diagonal(&[Scalar::Approx(1e-13), Scalar::Approx(1.0), Scalar::Approx(1.0)]);
        let det = tiny.determinant().unwrap();
        assert!((det.to_f64().unwrap() - 1e-13).abs() < 1e-25);
        assert!(tiny.is_invertible());

        let small = Matrix::diagonal(&[Scalar::Approx(1e-5), Scalar::Approx(1e-5), Scalar::Approx(1e-5)]);
        assert!(small.is_invertible());
        assert!(small.inverse().is_ok());
    }

    #[test]
    fn symbolic_determinant() {
        let a = Matrix::parse(&[vec!["a", "b"], vec!["c", "d"]]).unwrap();
        assert_eq!(a.determinant().unwrap().to_string(), "a*d - b*c");
    }

    #[test]
    fn submatrix_bounds() {
        let a = m(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 10]]);
        assert_eq!(a.submatrix(0, 1).unwrap(), m(&[&[4, 6], &[7, 10]]));
        assert!(matches!(a.submatrix(3, 0), Err(MatrixError::Shape(_))));
        assert!(matches!(m(&[&[1]]).submatrix(0, 0), Err(MatrixError::Shape(_))));
        assert!(matches!(m(&[&[1, 2]]).determinant(), Err(MatrixError::NotSquare(_))));
    }
}
