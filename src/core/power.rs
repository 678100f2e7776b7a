//! Real (and complex) matrix powers.
//!
//! Integer exponents use repeated squaring. Everything else is decided by
//! `power_strategy`: diagonalize when possible, otherwise go through the
//! principal logarithm and `exp(p * log A)`.
use num_complex::Complex64 as C64;

use crate::core::eigen::Diagonalization;
use crate::core::error::{MatrixError, MatrixResult};
use crate::core::matrix::Matrix;
use crate::core::numeric;
use crate::core::scalar::{Scalar, EPSILON};

/// Largest float magnitude whose integer part is represented exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PowerStrategy {
    Diagonalized(Diagonalization),
    LogExpFallback,
    Undefined(String),
}

/// No principal logarithm exists when an eigenvalue is zero or lies on the
/// negative real axis.
fn off_branch_cut(values: &[C64]) -> Option<C64> {
    let scale = values.iter().map(|z| z.norm()).fold(1.0, f64::max);
    values
        .iter()
        .copied()
        .find(|z| z.norm() <= EPSILON * scale || (z.im.abs() <= EPSILON * scale && z.re < 0.0))
}

/// Exact integers and integral floats (`2.0`) both take the repeated
/// squaring path; the flag records whether the result must be evaluated.
fn integer_exponent(exponent: &Scalar) -> Option<(i64, bool)> {
    if let Some(k) = exponent.as_integer() {
        return Some((k, false));
    }
    match exponent {
        Scalar::Approx(x) if x.fract() == 0.0 && x.abs() <= MAX_EXACT_FLOAT_INT => Some((*x as i64, true)),
        _ => None,
    }
}

impl Matrix {
    fn power_by_squaring(&self, mut k: u64) -> MatrixResult<Matrix> {
        let mut result = Matrix::identity(self.rows());
        let mut base = self.clone();
        while k > 0 {
            if k & 1 == 1 {
                result = result.multiply(&base)?;
            }
            k >>= 1;
            if k > 0 {
                base = base.multiply(&base)?;
            }
        }
        Ok(result)
    }

    /// Chooses how `self^exponent` is computed for exponents that are not
    /// exact integers.
    pub fn power_strategy(&self, exponent: &Scalar) -> MatrixResult<PowerStrategy> {
        self.require_square("power")?;
        if let Some(diag) = self.diagonalize()? {
            return Ok(PowerStrategy::Diagonalized(diag));
        }
        let (Ok(a), Ok(_)) = (self.to_dmatrix(), exponent.to_complex()) else {
            return Ok(PowerStrategy::Undefined(
                "matrix is not diagonalizable and has symbolic entries".to_string(),
            ));
        };
        let values = numeric::eigenvalues(&a)?;
        if let Some(z) = off_branch_cut(&values) {
            return Ok(PowerStrategy::Undefined(format!(
                "eigenvalue {} has no principal logarithm",
                Scalar::from_complex(z)
            )));
        }
        Ok(PowerStrategy::LogExpFallback)
    }

    pub fn power(&self, exponent: &Scalar) -> MatrixResult<Matrix> {
        self.require_square("power")?;
        let n = self.rows();
        if exponent.is_zero_within(0.0) {
            return Ok(Matrix::identity(n));
        }
        if let Some((k, floating)) = integer_exponent(exponent) {
            debug_log!("power: repeated squaring, exponent {}", k);
            let base = if k > 0 { self.clone() } else { self.inverse()? };
            let result = base.power_by_squaring(k.unsigned_abs())?;
            if floating {
                // free symbols stay symbolic
                if let Ok(evaluated) = result.evaluate() {
                    return Ok(evaluated);
                }
            }
            return Ok(result);
        }
        if exponent.is_negative_real() && !self.is_invertible() {
            return Err(MatrixError::singular("negative power of a singular matrix"));
        }

        match self.power_strategy(exponent)? {
            PowerStrategy::Diagonalized(Diagonalization { p, d, p_inv }) => {
                debug_log!("power: diagonalized");
                let powered = (0..n)
                    .map(|i| match d.get(i, i) {
                        Some(v) => v.pow(exponent),
                        None => Err(MatrixError::shape("diagonal factor is too small")),
                    })
                    .collect::<MatrixResult<Vec<_>>>()?;
                p.multiply(&Matrix::diagonal(&powered))?.multiply(&p_inv)
            }
            PowerStrategy::LogExpFallback => {
                debug_log!("power: exp(p log A) fallback");
                let a = self.to_dmatrix()?;
                let result = numeric::fractional_power(&a, exponent.to_complex()?)?;
                Ok(Matrix::from_dmatrix(&result))
            }
            PowerStrategy::Undefined(reason) => Err(MatrixError::UndefinedPower(reason)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(grid: &[&[i64]]) -> Matrix {
        Matrix::from_grid(&grid.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn zero_power_is_identity_even_when_singular() {
        let singular = m(&[&[1, 2], &[2, 4]]);
        assert_eq!(singular.power(&Scalar::zero()).unwrap(), Matrix::identity(2));
        assert_eq!(singular.power(&Scalar::Approx(0.0)).unwrap(), Matrix::identity(2));
    }

    #[test]
    fn integer_powers_square_repeatedly() {
        let a = m(&[&[1, 1], &[1, 0]]);
        assert_eq!(a.power(&Scalar::integer(10)).unwrap(), m(&[&[89, 55], &[55, 34]]));
        let inv_sq = a.power(&Scalar::integer(-2)).unwrap();
        assert_eq!(inv_sq.multiply(&a.power(&Scalar::integer(2)).unwrap()).unwrap(), Matrix::identity(2));
    }

    #[test]
    fn negative_powers_of_singular_matrices_fail() {
        let singular = m(&[&[1, 2], &[2, 4]]);
        assert!(matches!(singular.power(&Scalar::integer(-1)), Err(MatrixError::Singular(_))));
        assert!(matches!(singular.power(&Scalar::Approx(-0.5)), Err(MatrixError::Singular(_))));
    }

    #[test]
    fn square_root_of_diagonal_is_exact() {
        let a = m(&[&[4, 0], &[0, 9]]);
        let half = Scalar::parse("1/2").unwrap();
        assert_eq!(a.power(&half).unwrap(), m(&[&[2, 0], &[0, 3]]));
    }

    #[test]
    fn defective_matrix_uses_fallback() {
        let j = m(&[&[1, 1], &[0, 1]]);
        assert_eq!(j.power_strategy(&Scalar::Approx(0.5)).unwrap(), PowerStrategy::LogExpFallback);
        let root = j.power(&Scalar::Approx(0.5)).unwrap();
        let expected = Matrix::from_grid(&[vec![1.0, 0.5], vec![0.0, 1.0]]).unwrap();
        assert!(root.approx_eq(&expected));
    }

    #[test]
    fn defective_matrix_on_branch_cut_is_undefined() {
        let j = m(&[&[-1, 1], &[0, -1]]);
        assert!(matches!(j.power(&Scalar::Approx(0.5)), Err(MatrixError::UndefinedPower(_))));
    }

    #[test]
    fn integral_float_exponents_square_repeatedly() {
        let nilpotent = m(&[&[0, 1], &[0, 0]]);
        assert!(nilpotent.power(&Scalar::Approx(1.0)).unwrap().approx_eq(&nilpotent));
        assert!(nilpotent.power(&Scalar::Approx(2.0)).unwrap().approx_eq(&Matrix::zeros(2, 2)));

        let j = m(&[&[-1, 1], &[0, -1]]);
        let squared = j.power(&Scalar::Approx(2.0)).unwrap();
        assert_eq!(squared, Matrix::from_grid(&[vec![1.0, -2.0], vec![0.0, 1.0]]).unwrap());
        assert!(j.power(&Scalar::Approx(-1.0)).unwrap().approx_eq(&j.inverse().unwrap()));
    }

    #[test]
    fn non_square_power_fails() {
        assert!(matches!(m(&[&[1, 2]]).power(&Scalar::integer(2)), Err(MatrixError::NotSquare(_))));
    }
}
