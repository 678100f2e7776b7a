//! Univariate polynomials in `X` with scalar coefficients.
use std::fmt;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::{Integer, Roots};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Serialize, Serializer};

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::expr::Expr;
use crate::core::numeric::{self, ROOT_CLUSTER_TOL};
use crate::core::ring::Ring;
use crate::core::scalar::Scalar;

/// Constant terms with more divisors than this skip the rational-root search.
const MAX_DIVISOR_SEARCH: u64 = 1_000_000_000_000;

/// Coefficients are stored lowest degree first with trailing zeros trimmed,
/// so the zero polynomial has no coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<Scalar>,
}

impl Polynomial {
    pub fn new(mut coeffs: Vec<Scalar>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero_within(0.0)) {
            coeffs.pop();
        }
        Polynomial { coeffs }
    }

    pub fn constant(c: Scalar) -> Self {
        Polynomial::new(vec![c])
    }

    /// The monomial `X`.
    pub fn x() -> Self {
        Polynomial::new(vec![Scalar::zero(), Scalar::one()])
    }

    pub fn coefficients(&self) -> &[Scalar] {
        &self.coeffs
    }

    /// Degree, or `None` for the zero polynomial.
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn coefficient(&self, power: usize) -> Scalar {
        self.coeffs.get(power).cloned().unwrap_or_else(Scalar::zero)
    }

    pub fn evaluate(&self, at: &Scalar) -> Scalar {
        self.coeffs
            .iter()
            .rev()
            .fold(Scalar::zero(), |acc, c| acc.mul(at).add(c))
    }

    fn scale(&self, by: &Scalar) -> Polynomial {
        Polynomial::new(self.coeffs.iter().map(|c| c.mul(by)).collect())
    }

    /// Roots with multiplicity, sorted by (real, imaginary) part.
    ///
    /// Exact coefficients get exact rational roots, a closed form for a
    /// remaining quadratic, and numeric roots for anything of higher
    /// degree. Symbolic coefficients are solved in closed form up to
    /// degree two.
    pub fn roots(&self) -> MatrixResult<Vec<(Scalar, usize)>> {
        let mut out = match self.degree() {
            None => return Err(MatrixError::shape("the zero polynomial has no finite root set")),
            Some(0) => Vec::new(),
            _ if self.coeffs.iter().all(Scalar::is_exact) => self.exact_roots()?,
            _ if self.coeffs.iter().any(|c| matches!(c, Scalar::Symbolic(e) if !e.is_constant())) => {
                self.symbolic_roots()?
            }
            Some(d) if d <= 2 && self.coeffs.iter().any(Scalar::is_symbolic) => self.symbolic_roots()?,
            _ => self.numeric_roots()?,
        };
        out.sort_by(|a, b| a.0.value_order(&b.0));
        Ok(out)
    }

    fn exact_roots(&self) -> MatrixResult<Vec<(Scalar, usize)>> {
        let mut remaining = integer_coefficients(&self.coeffs);
        let mut found = Vec::new();

        let zeros = remaining.iter().take_while(|c| c.is_zero()).count();
        if zeros > 0 {
            remaining.drain(..zeros);
            found.push((Scalar::zero(), zeros));
        }

        if remaining.len() > 3 {
            for candidate in rational_candidates(&remaining) {
                let mut multiplicity = 0;
                while remaining.len() > 1 {
                    match deflate(&remaining, &candidate) {
                        Some(quotient) => {
                            remaining = quotient;
                            multiplicity += 1;
                        }
                        None => break,
                    }
                }
                if multiplicity > 0 {
                    found.push((Scalar::Exact(candidate), multiplicity));
                }
                if remaining.len() <= 3 {
                    break;
                }
            }
        }

        let rest: Vec<Scalar> = remaining
            .into_iter()
            .map(|c| Scalar::Exact(BigRational::from_integer(c)))
            .collect();
        let rest = Polynomial::new(rest);
        match rest.degree() {
            Some(1) | Some(2) => found.extend(rest.symbolic_roots()?),
            Some(d) if d > 2 => found.extend(rest.numeric_roots()?),
            _ => {}
        }
        Ok(merge_equal(found))
    }

    /// Closed forms for degree one and two.
    fn symbolic_roots(&self) -> MatrixResult<Vec<(Scalar, usize)>> {
        match self.degree() {
            Some(1) => Ok(vec![(self.coeffs[0].neg().div(&self.coeffs[1])?, 1)]),
            Some(2) => {
                let (c, b, a) = (&self.coeffs[0], &self.coeffs[1], &self.coeffs[2]);
                let disc = b.mul(b).sub(&Scalar::integer(4).mul(a).mul(c));
                let two_a = Scalar::integer(2).mul(a);
                if disc.is_zero() {
                    return Ok(vec![(b.neg().div(&two_a)?, 2)]);
                }
                let root = disc.sqrt()?;
                let minus = b.neg().sub(&root).div(&two_a)?;
                let plus = b.neg().add(&root).div(&two_a)?;
                Ok(merge_equal(vec![(minus, 1), (plus, 1)]))
            }
            Some(d) => Err(MatrixError::non_numeric(&format!(
                "no closed form for a degree {d} polynomial with symbolic coefficients"
            ))),
            None => Ok(Vec::new()),
        }
    }

    fn numeric_roots(&self) -> MatrixResult<Vec<(Scalar, usize)>> {
        let coeffs: Vec<Complex64> = self.coeffs.iter().map(Scalar::to_complex).collect::<MatrixResult<_>>()?;
        let roots = numeric::polynomial_roots(&coeffs)?;
        Ok(numeric::cluster(&roots, ROOT_CLUSTER_TOL)
            .into_iter()
            .map(|(z, k)| (Scalar::from_complex(z), k))
            .collect())
    }
}

fn merge_equal(roots: Vec<(Scalar, usize)>) -> Vec<(Scalar, usize)> {
    let mut out: Vec<(Scalar, usize)> = Vec::with_capacity(roots.len());
    for (r, k) in roots {
        match out.iter_mut().find(|(existing, _)| existing.approx_eq(&r)) {
            Some(entry) => entry.1 += k,
            None => out.push((r, k)),
        }
    }
    out
}

/// Scales rational coefficients to coprime integers.
fn integer_coefficients(coeffs: &[Scalar]) -> Vec<BigInt> {
    let rationals: Vec<BigRational> = coeffs.iter().filter_map(|c| c.as_rational().cloned()).collect();
    let lcm = rationals.iter().fold(BigInt::one(), |acc, r| acc.lcm(r.denom()));
    let ints: Vec<BigInt> = rationals
        .iter()
        .map(|r| (r * BigRational::from_integer(lcm.clone())).to_integer())
        .collect();
    let gcd = ints.iter().fold(BigInt::zero(), |acc, n| acc.gcd(n));
    if gcd.is_zero() || gcd.is_one() {
        ints
    } else {
        ints.into_iter().map(|n| n / &gcd).collect()
    }
}

fn divisors(n: &BigInt) -> Option<Vec<u64>> {
    let n = n.abs().to_u64()?;
    if n == 0 || n > MAX_DIVISOR_SEARCH {
        return None;
    }
    let mut small = Vec::new();
    let mut large = Vec::new();
    let limit = n.sqrt();
    for d in 1..=limit {
        if n % d == 0 {
            small.push(d);
            if d != n / d {
                large.push(n / d);
            }
        }
    }
    small.extend(large.into_iter().rev());
    Some(small)
}

/// Candidates `±p/q` with `p | a0` and `q | an`.
fn rational_candidates(coeffs: &[BigInt]) -> Vec<BigRational> {
    let (Some(first), Some(last)) = (coeffs.first(), coeffs.last()) else {
        return Vec::new();
    };
    let (Some(ps), Some(qs)) = (divisors(first), divisors(last)) else {
        return Vec::new();
    };
    let mut out: Vec<BigRational> = Vec::new();
    for p in &ps {
        for q in &qs {
            let r = BigRational::new(BigInt::from(*p), BigInt::from(*q));
            for candidate in [r.clone(), -r] {
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
    }
    out
}

/// Synthetic division by `(q X - p)` for `root = p/q`; `None` when the
/// root does not divide evenly.
fn deflate(coeffs: &[BigInt], root: &BigRational) -> Option<Vec<BigInt>> {
    let value = coeffs
        .iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * root + BigRational::from_integer(c.clone()));
    if !value.is_zero() {
        return None;
    }
    let n = coeffs.len() - 1;
    let mut quotient = vec![BigRational::zero(); n];
    let mut carry = BigRational::zero();
    for i in (0..n).rev() {
        carry = carry * root + BigRational::from_integer(coeffs[i + 1].clone());
        quotient[i] = carry.clone();
    }
    let as_scalars: Vec<Scalar> = quotient.into_iter().map(Scalar::Exact).collect();
    Some(integer_coefficients(&as_scalars))
}

impl Ring for Polynomial {
    fn zero() -> Self {
        Polynomial::new(Vec::new())
    }

    fn one() -> Self {
        Polynomial::constant(Scalar::one())
    }

    fn add(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..n).map(|i| self.coefficient(i).add(&other.coefficient(i))).collect())
    }

    fn sub(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Polynomial::new((0..n).map(|i| self.coefficient(i).sub(&other.coefficient(i))).collect())
    }

    fn mul(&self, other: &Self) -> Self {
        if self.coeffs.is_empty() || other.coeffs.is_empty() {
            return <Polynomial as Ring>::zero();
        }
        let mut out = vec![Scalar::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                out[i + j] = out[i + j].add(&a.mul(b));
            }
        }
        Polynomial::new(out)
    }

    fn neg(&self) -> Self {
        self.scale(&Scalar::integer(-1))
    }

    fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::new();
        for (power, coeff) in self.coeffs.iter().enumerate().rev() {
            if coeff.is_zero_within(0.0) {
                continue;
            }
            let monomial = match power {
                0 => Expr::one(),
                1 => Expr::symbol("X"),
                p => Expr::pow(Expr::symbol("X"), Expr::integer(p as i64)),
            };
            let term = Expr::mul(coeff.to_expr(), monomial).to_string();
            if rendered.is_empty() {
                rendered = term;
            } else if let Some(stripped) = term.strip_prefix('-') {
                rendered.push_str(" - ");
                rendered.push_str(stripped);
            } else {
                rendered.push_str(" + ");
                rendered.push_str(&term);
            }
        }
        if rendered.is_empty() {
            rendered.push('0');
        }
        f.write_str(&rendered)
    }
}

impl Serialize for Polynomial {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
