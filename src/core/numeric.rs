//! Floating-point kernels over `DMatrix<C64>`: eigenvalues, polynomial
//! roots, and the matrix exponential, square root, and logarithm used for
//! non-integer powers of non-diagonalizable matrices.
use nalgebra::{DMatrix, Schur};
use num_complex::Complex64 as C64;

use crate::core::error::{MatrixError, MatrixResult};

/// Distance under which two numeric roots are treated as one repeated root.
pub const ROOT_CLUSTER_TOL: f64 = 1e-6;

const SCHUR_EPS: f64 = 1e-14;
const SCHUR_MAX_ITER: usize = 10_000;
const SERIES_TERMS: usize = 200;
const SQRT_ITER: usize = 100;

#[inline]
fn c(r: f64, i: f64) -> C64 {
    C64::new(r, i)
}

/// Maximum absolute column sum.
pub fn norm1(m: &DMatrix<C64>) -> f64 {
    m.column_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}

pub fn inverse(m: &DMatrix<C64>) -> MatrixResult<DMatrix<C64>> {
    m.clone()
        .try_inverse()
        .ok_or_else(|| MatrixError::singular("matrix is not invertible"))
}

/// Eigenvalues of a 2x2 block `[[a, b], [c, d]]`.
fn block_eigenvalues(a: C64, b: C64, cc: C64, d: C64) -> (C64, C64) {
    let half_trace = (a + d) * 0.5;
    let det = a * d - b * cc;
    let disc = (half_trace * half_trace - det).sqrt();
    (half_trace + disc, half_trace - disc)
}

/// All eigenvalues (with repetition) via the complex Schur form.
pub fn eigenvalues(m: &DMatrix<C64>) -> MatrixResult<Vec<C64>> {
    let n = m.nrows();
    if n == 0 {
        return Ok(Vec::new());
    }
    let schur = Schur::try_new(m.clone(), SCHUR_EPS, SCHUR_MAX_ITER)
        .ok_or_else(|| MatrixError::non_numeric("eigenvalue iteration did not converge"))?;
    let (_, t) = schur.unpack();
    let scale = norm1(&t).max(1.0);
    let mut out = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        if i + 1 < n && t[(i + 1, i)].norm() > SCHUR_EPS * scale * 1e3 {
            let (l1, l2) = block_eigenvalues(t[(i, i)], t[(i, i + 1)], t[(i + 1, i)], t[(i + 1, i + 1)]);
            out.push(l1);
            out.push(l2);
            i += 2;
        } else {
            out.push(t[(i, i)]);
            i += 1;
        }
    }
    Ok(out)
}

/// Roots of `coeffs[0] + coeffs[1] x + ...` through the companion matrix.
pub fn polynomial_roots(coeffs: &[C64]) -> MatrixResult<Vec<C64>> {
    let degree = coeffs.iter().rposition(|z| z.norm() != 0.0).unwrap_or(0);
    if degree == 0 {
        return Ok(Vec::new());
    }
    let lead = coeffs[degree];
    let companion = DMatrix::from_fn(degree, degree, |r, col| {
        if r == 0 {
            -coeffs[degree - 1 - col] / lead
        } else if r == col + 1 {
            c(1.0, 0.0)
        } else {
            c(0.0, 0.0)
        }
    });
    eigenvalues(&companion)
}

/// Groups values closer than `tol`, returning each cluster's mean and size.
pub fn cluster(values: &[C64], tol: f64) -> Vec<(C64, usize)> {
    let mut groups: Vec<(C64, usize)> = Vec::new();
    for &v in values {
        match groups.iter_mut().find(|(center, _)| (*center - v).norm() <= tol * (1.0 + v.norm())) {
            Some((center, count)) => {
                *center = (*center * (*count as f64) + v) / ((*count + 1) as f64);
                *count += 1;
            }
            None => groups.push((v, 1)),
        }
    }
    groups
}

/// exp(A) by scaling and squaring around a truncated Taylor series.
pub fn expm(a: &DMatrix<C64>) -> DMatrix<C64> {
    let n = a.nrows();
    let norm = norm1(a);
    let squarings = if norm > 0.5 { (norm / 0.5).log2().ceil() as i32 } else { 0 };
    let scaled = a / c(2f64.powi(squarings), 0.0);

    let mut sum = DMatrix::<C64>::identity(n, n);
    let mut term = DMatrix::<C64>::identity(n, n);
    for k in 1..=SERIES_TERMS {
        term = &term * &scaled / c(k as f64, 0.0);
        sum += &term;
        if norm1(&term) <= f64::EPSILON * norm1(&sum) {
            break;
        }
    }
    for _ in 0..squarings {
        sum = &sum * &sum;
    }
    sum
}

/// Principal square root by the Denman–Beavers iteration.
pub fn sqrtm(a: &DMatrix<C64>) -> MatrixResult<DMatrix<C64>> {
    let n = a.nrows();
    let mut y = a.clone();
    let mut z = DMatrix::<C64>::identity(n, n);
    for _ in 0..SQRT_ITER {
        let y_inv = inverse(&y)?;
        let z_inv = inverse(&z)?;
        let next_y = (&y + &z_inv) * c(0.5, 0.0);
        let next_z = (&z + &y_inv) * c(0.5, 0.0);
        let delta = norm1(&(&next_y - &y));
        y = next_y;
        z = next_z;
        if delta <= 1e-15 * norm1(&y).max(1.0) {
            break;
        }
    }
    Ok(y)
}

/// Principal logarithm by inverse scaling and squaring: take square roots
/// until `X` is near the identity, sum the series for `2 atanh(W)` with
/// `W = (X - I)(X + I)^-1`, then scale back by `2^k`.
pub fn logm(a: &DMatrix<C64>) -> MatrixResult<DMatrix<C64>> {
    let n = a.nrows();
    let eye = DMatrix::<C64>::identity(n, n);
    let mut x = a.clone();
    let mut roots = 0;
    while norm1(&(&x - &eye)) > 0.25 && roots < 64 {
        x = sqrtm(&x)?;
        roots += 1;
    }
    debug_log!("logm: {} square roots before series", roots);

    let w = (&x - &eye) * inverse(&(&x + &eye))?;
    let w2 = &w * &w;
    let mut power = w.clone();
    let mut sum = w.clone();
    for m in 1..SERIES_TERMS {
        power = &power * &w2;
        let term = &power / c((2 * m + 1) as f64, 0.0);
        sum += &term;
        if norm1(&term) <= f64::EPSILON * norm1(&sum).max(f64::MIN_POSITIVE) {
            break;
        }
    }
    Ok(sum * c(2f64.powi(roots + 1), 0.0))
}

/// `A^p = exp(p log A)` on the principal branch.
pub fn fractional_power(a: &DMatrix<C64>, p: C64) -> MatrixResult<DMatrix<C64>> {
    let log = logm(a)?;
    Ok(expm(&(log * p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(rows: usize, cols: usize, data: &[f64]) -> DMatrix<C64> {
        DMatrix::from_row_slice(rows, cols, &data.iter().map(|&x| c(x, 0.0)).collect::<Vec<_>>())
    }

    fn close(a: &DMatrix<C64>, b: &DMatrix<C64>, tol: f64) -> bool {
        norm1(&(a - b)) <= tol
    }

    #[test]
    fn eigenvalues_of_rotation_are_imaginary() {
        let mut ev = eigenvalues(&real(2, 2, &[0.0, -1.0, 1.0, 0.0])).unwrap();
        ev.sort_by(|a, b| a.im.total_cmp(&b.im));
        assert!((ev[0] - c(0.0, -1.0)).norm() < 1e-10);
        assert!((ev[1] - c(0.0, 1.0)).norm() < 1e-10);
    }

    #[test]
    fn cubic_roots_from_companion() {
        // (x - 1)(x - 2)(x - 3) = x^3 - 6x^2 + 11x - 6
        let coeffs = [c(-6.0, 0.0), c(11.0, 0.0), c(-6.0, 0.0), c(1.0, 0.0)];
        let mut roots: Vec<f64> = polynomial_roots(&coeffs).unwrap().iter().map(|z| z.re).collect();
        roots.sort_by(f64::total_cmp);
        for (got, want) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn clustering_merges_near_duplicates() {
        let groups = cluster(&[c(2.0, 0.0), c(2.0 + 1e-9, 0.0), c(5.0, 0.0)], ROOT_CLUSTER_TOL);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].1, 2);
    }

    #[test]
    fn exp_of_nilpotent_is_polynomial() {
        let n = real(2, 2, &[0.0, 1.0, 0.0, 0.0]);
        assert!(close(&expm(&n), &real(2, 2, &[1.0, 1.0, 0.0, 1.0]), 1e-12));
    }

    #[test]
    fn sqrt_and_log_invert_exp() {
        let a = real(2, 2, &[4.0, 1.0, 0.0, 9.0]);
        let r = sqrtm(&a).unwrap();
        assert!(close(&(&r * &r), &a, 1e-9));
        let l = logm(&a).unwrap();
        assert!(close(&expm(&l), &a, 1e-8));
    }

    #[test]
    fn half_power_of_jordan_block() {
        let j = real(2, 2, &[1.0, 1.0, 0.0, 1.0]);
        let h = fractional_power(&j, c(0.5, 0.0)).unwrap();
        assert!(close(&h, &real(2, 2, &[1.0, 0.5, 0.0, 1.0]), 1e-9));
    }

    #[test]
    fn singular_inverse_fails() {
        assert!(matches!(inverse(&real(2, 2, &[1.0, 2.0, 2.0, 4.0])), Err(MatrixError::Singular(_))));
    }
}
