//! Characteristic polynomial, eigenvalues, and diagonalization.
use num_complex::Complex64 as C64;

use crate::core::error::MatrixResult;
use crate::core::matrix::Matrix;
use crate::core::numeric::{self, ROOT_CLUSTER_TOL};
use crate::core::polynomial::Polynomial;
use crate::core::ring::{laplace_determinant, Ring};
use crate::core::scalar::{Scalar, TOLERANCE};

/// Relative threshold for treating a pivot as zero in the floating nullspace.
const NULLSPACE_TOL: f64 = 1e-8;

/// `A = P * D * P^-1` with `D` diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagonalization {
    pub p: Matrix,
    pub d: Matrix,
    pub p_inv: Matrix,
}

impl Diagonalization {
    pub fn eigenvalues(&self) -> Vec<Scalar> {
        (0..self.d.rows()).filter_map(|i| self.d.get(i, i).cloned()).collect()
    }
}

fn sort_by_value(values: &mut [(Scalar, usize)]) {
    values.sort_by(|a, b| a.0.value_order(&b.0));
}

/// Basis of the nullspace of `m` over the scalar model, by reduced row
/// echelon form. Pivots are chosen with `Scalar::is_zero`.
fn exact_nullspace(m: &Matrix) -> MatrixResult<Vec<Vec<Scalar>>> {
    let (rows, cols) = m.shape();
    let mut r: Vec<Vec<Scalar>> = m.data().to_vec();
    let mut pivots: Vec<usize> = Vec::new();
    let mut lead = 0;
    for col in 0..cols {
        let Some(found) = (lead..rows).find(|&i| !r[i][col].is_zero()) else {
            continue;
        };
        r.swap(lead, found);
        let pivot = r[lead][col].clone();
        for j in 0..cols {
            r[lead][j] = r[lead][j].div(&pivot)?;
        }
        for i in 0..rows {
            if i != lead && !r[i][col].is_zero() {
                let factor = r[i][col].clone();
                for j in 0..cols {
                    let delta = factor.mul(&r[lead][j]);
                    r[i][j] = r[i][j].sub(&delta);
                }
            }
        }
        pivots.push(col);
        lead += 1;
        if lead == rows {
            break;
        }
    }

    let mut basis = Vec::new();
    for free in (0..cols).filter(|c| !pivots.contains(c)) {
        let mut v = vec![Scalar::zero(); cols];
        v[free] = Scalar::one();
        for (row, &pc) in pivots.iter().enumerate() {
            v[pc] = r[row][free].neg();
        }
        basis.push(v);
    }
    Ok(basis)
}

/// Floating counterpart of `exact_nullspace` with partial pivoting.
fn numeric_nullspace(mut r: Vec<Vec<C64>>) -> Vec<Vec<C64>> {
    let rows = r.len();
    let cols = r.first().map_or(0, Vec::len);
    let scale = r.iter().flatten().map(|z| z.norm()).fold(1.0, f64::max);
    let tol = NULLSPACE_TOL * scale;
    let mut pivots: Vec<usize> = Vec::new();
    let mut lead = 0;
    for col in 0..cols {
        if lead == rows {
            break;
        }
        let best = (lead..rows)
            .max_by(|&a, &b| r[a][col].norm().total_cmp(&r[b][col].norm()))
            .unwrap_or(lead);
        if r[best][col].norm() <= tol {
            continue;
        }
        r.swap(lead, best);
        let pivot = r[lead][col];
        for j in 0..cols {
            r[lead][j] /= pivot;
        }
        for i in 0..rows {
            if i != lead {
                let factor = r[i][col];
                for j in 0..cols {
                    let delta = factor * r[lead][j];
                    r[i][j] -= delta;
                }
            }
        }
        pivots.push(col);
        lead += 1;
    }

    (0..cols)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = vec![C64::new(0.0, 0.0); cols];
            v[free] = C64::new(1.0, 0.0);
            for (row, &pc) in pivots.iter().enumerate() {
                v[pc] = -r[row][free];
            }
            v
        })
        .collect()
}

impl Matrix {
    /// `det(X*I - A)` expanded over the polynomial ring.
    pub fn characteristic_equation(&self) -> MatrixResult<Polynomial> {
        self.require_square("characteristic polynomial")?;
        let n = self.rows();
        let grid: Vec<Vec<Polynomial>> = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        let entry = Polynomial::constant(self.data()[i][j].neg());
                        if i == j {
                            entry.add(&Polynomial::x())
                        } else {
                            entry
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(laplace_determinant(&grid))
    }

    /// Eigenvalues paired with their algebraic multiplicity, ordered by
    /// real then imaginary part.
    pub fn eigenvalues_with_multiplicity(&self) -> MatrixResult<Vec<(Scalar, usize)>> {
        self.require_square("eigenvalues")?;
        if self.is_numeric() {
            debug_log!("eigenvalues: Schur decomposition of {}x{}", self.rows(), self.cols());
            let values = numeric::eigenvalues(&self.to_dmatrix()?)?;
            let mut grouped: Vec<(Scalar, usize)> = numeric::cluster(&values, ROOT_CLUSTER_TOL)
                .into_iter()
                .map(|(z, k)| (Scalar::from_complex(z), k))
                .collect();
            sort_by_value(&mut grouped);
            return Ok(grouped);
        }
        debug_log!("eigenvalues: roots of the characteristic polynomial");
        self.characteristic_equation()?.roots()
    }

    /// Distinct eigenvalues; `numeric` evaluates them to floating values.
    pub fn eigenvalues(&self, numeric: bool) -> MatrixResult<Vec<Scalar>> {
        let values = self.eigenvalues_with_multiplicity()?;
        if !numeric {
            return Ok(values.into_iter().map(|(v, _)| v).collect());
        }
        let mut out: Vec<(Scalar, usize)> = Vec::with_capacity(values.len());
        for (v, k) in values {
            let approx = v.evaluate()?;
            if !out.iter().any(|(seen, _)| {
                seen.to_complex().ok().zip(approx.to_complex().ok()).is_some_and(|(a, b)| (a - b).norm() <= TOLERANCE)
            }) {
                out.push((approx, k));
            }
        }
        sort_by_value(&mut out);
        Ok(out.into_iter().map(|(v, _)| v).collect())
    }

    /// `Some` when every eigenvalue has as many independent eigenvectors as
    /// its multiplicity. Rational spectra (and matrices with free symbols)
    /// are decomposed exactly, everything else in floating point.
    pub fn diagonalize(&self) -> MatrixResult<Option<Diagonalization>> {
        let spectrum = self.eigenvalues_with_multiplicity()?;
        let n = self.rows();
        let has_free_symbols = self
            .elements()
            .any(|x| matches!(x, Scalar::Symbolic(e) if !e.is_constant()));

        if has_free_symbols || spectrum.iter().all(|(v, _)| v.is_exact()) {
            debug_log!("diagonalize: exact eigenvectors for {} eigenvalues", spectrum.len());
            let mut columns: Vec<Vec<Scalar>> = Vec::with_capacity(n);
            let mut diagonal: Vec<Scalar> = Vec::with_capacity(n);
            for (value, multiplicity) in &spectrum {
                let shifted = self.subtract(&Matrix::identity(n).scalar_multiply(value))?;
                let basis = exact_nullspace(&shifted)?;
                if basis.len() < *multiplicity {
                    return Ok(None);
                }
                diagonal.extend(std::iter::repeat(value.clone()).take(basis.len()));
                columns.extend(basis);
            }
            if columns.len() != n {
                return Ok(None);
            }
            let p = Matrix::from_fn(n, n, |i, j| columns[j][i].clone());
            let p_inv = p.inverse()?;
            return Ok(Some(Diagonalization { p, d: Matrix::diagonal(&diagonal), p_inv }));
        }

        debug_log!("diagonalize: floating eigenvectors");
        let a = self.to_dmatrix()?;
        let mut columns: Vec<Vec<C64>> = Vec::with_capacity(n);
        let mut diagonal: Vec<C64> = Vec::with_capacity(n);
        for (value, multiplicity) in &spectrum {
            let lambda = value.to_complex()?;
            let mut shifted = a.clone();
            for i in 0..n {
                shifted[(i, i)] -= lambda;
            }
            let rows: Vec<Vec<C64>> = (0..n).map(|i| (0..n).map(|j| shifted[(i, j)]).collect()).collect();
            let basis = numeric_nullspace(rows);
            if basis.len() < *multiplicity {
                return Ok(None);
            }
            diagonal.extend(std::iter::repeat(lambda).take(*multiplicity));
            columns.extend(basis.into_iter().take(*multiplicity));
        }
        if columns.len() != n {
            return Ok(None);
        }
        let p = nalgebra::DMatrix::from_fn(n, n, |i, j| columns[j][i]);
        let p_inv = match numeric::inverse(&p) {
            Ok(inv) => inv,
            Err(_) => return Ok(None),
        };
        let d = nalgebra::DMatrix::from_fn(n, n, |i, j| if i == j { diagonal[i] } else { C64::new(0.0, 0.0) });
        Ok(Some(Diagonalization {
            p: Matrix::from_dmatrix(&p),
            d: Matrix::from_dmatrix(&d),
            p_inv: Matrix::from_dmatrix(&p_inv),
        }))
    }

    pub fn is_diagonalizable(&self) -> bool {
        self.is_square() && matches!(self.diagonalize(), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(grid: &[&[i64]]) -> Matrix {
        Matrix::from_grid(&grid.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn characteristic_polynomial_renders() {
        let p = m(&[&[1, 2], &[3, 4]]).characteristic_equation().unwrap();
        assert_eq!(p.to_string(), "X**2 - 5*X - 2");
        let q = m(&[&[2, 0, 0], &[0, 3, 0], &[0, 0, 4]]).characteristic_equation().unwrap();
        assert_eq!(q.to_string(), "X**3 - 9*X**2 + 26*X - 24");
    }

    #[test]
    fn diagonal_eigenvalues() {
        let a = m(&[&[2, 0, 0], &[0, 3, 0], &[0, 0, 4]]);
        assert_eq!(a.eigenvalues(false).unwrap(), vec![Scalar::integer(2), Scalar::integer(3), Scalar::integer(4)]);
        let numeric = a.eigenvalues(true).unwrap();
        assert_eq!(numeric, vec![Scalar::Approx(2.0), Scalar::Approx(3.0), Scalar::Approx(4.0)]);
    }

    #[test]
    fn repeated_eigenvalues_are_distinct_once() {
        let a = m(&[&[2, 1], &[0, 2]]);
        assert_eq!(a.eigenvalues(false).unwrap(), vec![Scalar::integer(2)]);
        assert_eq!(a.eigenvalues_with_multiplicity().unwrap(), vec![(Scalar::integer(2), 2)]);
    }

    #[test]
    fn floating_matrices_use_schur() {
        let a = m(&[&[0, -1], &[1, 0]]).evaluate().unwrap();
        let ev = a.eigenvalues(true).unwrap();
        assert_eq!(ev.len(), 2);
        assert!(ev[0].approx_eq(&Scalar::from_complex(C64::new(0.0, -1.0))));
        assert!(ev[1].approx_eq(&Scalar::from_complex(C64::new(0.0, 1.0))));
    }

    #[test]
    fn defective_matrix_is_not_diagonalizable() {
        assert!(!m(&[&[1, 1], &[0, 1]]).is_diagonalizable());
        assert!(m(&[&[1, 0], &[0, 1]]).is_diagonalizable());
        assert!(!m(&[&[1, 2, 3]]).is_diagonalizable());
    }

    #[test]
    fn exact_diagonalization_reconstructs() {
        let a = m(&[&[4, 1], &[2, 3]]);
        let diag = a.diagonalize().unwrap().unwrap();
        assert_eq!(diag.eigenvalues(), vec![Scalar::integer(2), Scalar::integer(5)]);
        let back = diag.p.multiply(&diag.d).unwrap().multiply(&diag.p_inv).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn irrational_spectrum_diagonalizes_numerically() {
        let a = m(&[&[1, 2], &[3, 4]]);
        let diag = a.diagonalize().unwrap().unwrap();
        let back = diag.p.multiply(&diag.d).unwrap().multiply(&diag.p_inv).unwrap();
        assert!(back.approx_eq(&a));
    }
}
