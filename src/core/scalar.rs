//! Matrix elements: exact rationals, floats, approximate complex numbers,
//! and symbolic expressions, with per-pair promotion.
//!
//! - Exact ∘ Exact → Exact
//! - Exact ∘ Approx → Approx, numeric ∘ Complex → Complex
//! - anything ∘ Symbolic → Symbolic, renormalized (a rational result is
//!   Exact again, a constant result with float leaves is evaluated)

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::expr::{complex_pow, format_float, rational_to_f64, Expr};
use crate::core::parser::parse_expr;
use crate::core::ring::Ring;

/// Absolute threshold below which a floating value counts as zero.
pub const EPSILON: f64 = 1e-12;
/// Tolerance for elementwise comparison of floating results.
pub const TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Exact(BigRational),
    Approx(f64),
    Complex(Complex64),
    Symbolic(Expr),
}

impl Scalar {
    pub fn zero() -> Self { Scalar::Exact(BigRational::zero()) }
    pub fn one() -> Self { Scalar::Exact(BigRational::one()) }

    pub fn integer(n: i64) -> Self {
        Scalar::Exact(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn ratio(numer: i64, denom: i64) -> MatrixResult<Self> {
        if denom == 0 {
            return Err(MatrixError::division_by_zero());
        }
        Ok(Scalar::Exact(BigRational::new(BigInt::from(numer), BigInt::from(denom))))
    }

    /// Parse an integer, float, rational, or expression token.
    pub fn parse(token: &str) -> MatrixResult<Self> {
        let trimmed = token.trim();
        if let Ok(n) = trimmed.parse::<BigInt>() {
            return Ok(Scalar::Exact(BigRational::from_integer(n)));
        }
        parse_expr(trimmed).map(Scalar::from_expr)
    }

    /// Canonical scalar for an already-normalized expression.
    pub fn from_expr(expr: Expr) -> Self {
        match expr {
            Expr::Rational(r) => Scalar::Exact(r),
            Expr::Float(f) => Scalar::Approx(f),
            e if e.is_constant() && e.contains_float() => match e.eval() {
                Ok(z) => Scalar::from_complex(z),
                Err(_) => Scalar::Symbolic(e),
            },
            e => Scalar::Symbolic(e),
        }
    }

    /// Complex values with a negligible imaginary part collapse to `Approx`.
    pub fn from_complex(z: Complex64) -> Self {
        if z.im.abs() <= EPSILON {
            Scalar::Approx(z.re)
        } else {
            Scalar::Complex(z)
        }
    }

    pub fn to_expr(&self) -> Expr {
        match self {
            Scalar::Exact(r) => Expr::Rational(r.clone()),
            Scalar::Approx(f) => Expr::Float(*f),
            Scalar::Complex(z) => Expr::from_complex(*z),
            Scalar::Symbolic(e) => e.clone(),
        }
    }

    pub fn is_exact(&self) -> bool { matches!(self, Scalar::Exact(_)) }
    pub fn is_symbolic(&self) -> bool { matches!(self, Scalar::Symbolic(_)) }
    pub fn is_numeric(&self) -> bool { matches!(self, Scalar::Approx(_) | Scalar::Complex(_)) }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Scalar::Exact(r) => Some(r),
            _ => None,
        }
    }

    /// The value as an `i64` when it is an exact integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Exact(r) if r.is_integer() => r.numer().to_i64(),
            _ => None,
        }
    }

    /// Numeric value for non-symbolic variants. Symbolic values go through `to_complex`.
    fn c64(&self) -> Complex64 {
        match self {
            Scalar::Exact(r) => Complex64::new(rational_to_f64(r), 0.0),
            Scalar::Approx(f) => Complex64::new(*f, 0.0),
            Scalar::Complex(z) => *z,
            Scalar::Symbolic(e) => e.eval().unwrap_or(Complex64::new(f64::NAN, f64::NAN)),
        }
    }

    pub fn to_complex(&self) -> MatrixResult<Complex64> {
        match self {
            Scalar::Symbolic(e) => e.eval(),
            other => Ok(other.c64()),
        }
    }

    /// Real value; complex values with a non-negligible imaginary part fail.
    pub fn to_f64(&self) -> MatrixResult<f64> {
        let z = self.to_complex()?;
        if z.im.abs() > EPSILON {
            return Err(MatrixError::non_numeric(&format!("{self} is not real")));
        }
        Ok(z.re)
    }

    /// Floating approximation as an `Approx` or `Complex` scalar.
    pub fn evaluate(&self) -> MatrixResult<Scalar> {
        match self {
            Scalar::Exact(r) => Ok(Scalar::Approx(rational_to_f64(r))),
            Scalar::Approx(_) | Scalar::Complex(_) => Ok(self.clone()),
            Scalar::Symbolic(e) => e.eval().map(Scalar::from_complex),
        }
    }

    /// Magnitude used to choose pivots; symbolic values without a numeric value count as zero.
    pub fn magnitude(&self) -> f64 {
        self.to_complex().map(|z| z.norm()).unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.is_zero_within(EPSILON)
    }

    /// Exact for exact values; `tol` for floating values; symbolic values are
    /// evaluated when constant and otherwise only structurally zero.
    pub fn is_zero_within(&self, tol: f64) -> bool {
        match self {
            Scalar::Exact(r) => r.is_zero(),
            Scalar::Approx(f) => f.abs() <= tol,
            Scalar::Complex(z) => z.norm() <= tol,
            Scalar::Symbolic(e) => {
                if e.is_zero() {
                    return true;
                }
                e.is_constant() && e.eval().map(|z| z.norm() <= tol).unwrap_or(false)
            }
        }
    }

    fn is_exact_zero(&self) -> bool {
        match self {
            Scalar::Exact(r) => r.is_zero(),
            Scalar::Approx(f) => *f == 0.0,
            Scalar::Complex(z) => z.re == 0.0 && z.im == 0.0,
            Scalar::Symbolic(_) => self.is_zero(),
        }
    }

    /// Equality used by predicates and tests: exact for exact pairs,
    /// relative `TOLERANCE` once a floating value is involved.
    pub fn approx_eq(&self, other: &Scalar) -> bool {
        if let (Scalar::Exact(a), Scalar::Exact(b)) = (self, other) {
            return a == b;
        }
        let diff = self.sub(other);
        let scale = 1.0 + self.magnitude().max(other.magnitude());
        diff.is_zero_within(TOLERANCE * scale)
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Exact(a), Scalar::Exact(b)) => Scalar::Exact(a + b),
            (Scalar::Symbolic(_), _) | (_, Scalar::Symbolic(_)) => {
                Scalar::from_expr(Expr::add(self.to_expr(), other.to_expr()))
            }
            (Scalar::Complex(_), _) | (_, Scalar::Complex(_)) => Scalar::from_complex(self.c64() + other.c64()),
            _ => Scalar::Approx(self.c64().re + other.c64().re),
        }
    }

    pub fn sub(&self, other: &Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Exact(a), Scalar::Exact(b)) => Scalar::Exact(a - b),
            (Scalar::Symbolic(_), _) | (_, Scalar::Symbolic(_)) => {
                Scalar::from_expr(Expr::sub(self.to_expr(), other.to_expr()))
            }
            (Scalar::Complex(_), _) | (_, Scalar::Complex(_)) => Scalar::from_complex(self.c64() - other.c64()),
            _ => Scalar::Approx(self.c64().re - other.c64().re),
        }
    }

    pub fn mul(&self, other: &Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Exact(a), Scalar::Exact(b)) => Scalar::Exact(a * b),
            (Scalar::Symbolic(_), _) | (_, Scalar::Symbolic(_)) => {
                Scalar::from_expr(Expr::mul(self.to_expr(), other.to_expr()))
            }
            (Scalar::Complex(_), _) | (_, Scalar::Complex(_)) => Scalar::from_complex(self.c64() * other.c64()),
            _ => Scalar::Approx(self.c64().re * other.c64().re),
        }
    }

    pub fn neg(&self) -> Scalar {
        match self {
            Scalar::Exact(r) => Scalar::Exact(-r.clone()),
            Scalar::Approx(f) => Scalar::Approx(-f),
            Scalar::Complex(z) => Scalar::Complex(-z),
            Scalar::Symbolic(e) => Scalar::from_expr(Expr::neg(e.clone())),
        }
    }

    pub fn div(&self, other: &Scalar) -> MatrixResult<Scalar> {
        if other.is_exact_zero() {
            return Err(MatrixError::division_by_zero());
        }
        Ok(match (self, other) {
            (Scalar::Exact(a), Scalar::Exact(b)) => Scalar::Exact(a / b),
            (Scalar::Symbolic(_), _) | (_, Scalar::Symbolic(_)) => {
                Scalar::from_expr(Expr::div(self.to_expr(), other.to_expr()))
            }
            (Scalar::Complex(_), _) | (_, Scalar::Complex(_)) => Scalar::from_complex(self.c64() / other.c64()),
            _ => Scalar::Approx(self.c64().re / other.c64().re),
        })
    }

    pub fn recip(&self) -> MatrixResult<Scalar> {
        Scalar::one().div(self)
    }

    /// Real (or complex) power on the principal branch. `0^p` with
    /// `Re(p) < 0` fails with `DivisionByZero`.
    pub fn pow(&self, exp: &Scalar) -> MatrixResult<Scalar> {
        if exp.is_exact_zero() {
            return Ok(if exp.is_exact() { Scalar::one() } else { Scalar::Approx(1.0) });
        }
        if self.is_exact_zero() {
            let re = exp.to_complex().map(|z| z.re);
            return match re {
                Ok(re) if re > 0.0 => Ok(self.clone()),
                Ok(_) => Err(MatrixError::division_by_zero()),
                Err(_) => Ok(Scalar::from_expr(Expr::pow(self.to_expr(), exp.to_expr()))),
            };
        }
        Ok(match (self, exp) {
            (Scalar::Exact(_), Scalar::Exact(_)) | (Scalar::Symbolic(_), _) | (_, Scalar::Symbolic(_)) => {
                Scalar::from_expr(Expr::pow(self.to_expr(), exp.to_expr()))
            }
            _ => Scalar::from_complex(complex_pow(self.c64(), exp.c64())),
        })
    }

    pub fn powi(&self, k: i64) -> MatrixResult<Scalar> {
        self.pow(&Scalar::integer(k))
    }

    pub fn sqrt(&self) -> MatrixResult<Scalar> {
        self.pow(&Scalar::Exact(BigRational::new(BigInt::one(), BigInt::from(2))))
    }

    /// Ordering key (real part, imaginary part) used to sort eigenvalues.
    /// Both parts are snapped to a `TOLERANCE` grid so rounding noise in a
    /// real part cannot reorder a conjugate pair.
    pub fn sort_key(&self) -> (f64, f64) {
        let snap = |x: f64| (x / TOLERANCE).round() * TOLERANCE + 0.0;
        let z = self.c64();
        (snap(z.re), snap(z.im))
    }

    pub fn value_order(&self, other: &Scalar) -> Ordering {
        let (a, b) = (self.sort_key(), other.sort_key());
        a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1))
    }

    pub fn is_negative_real(&self) -> bool {
        match self {
            Scalar::Exact(r) => r.is_negative(),
            other => other.to_complex().map(|z| z.im.abs() <= EPSILON && z.re < 0.0).unwrap_or(false),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Exact(r) => write!(f, "{r}"),
            Scalar::Approx(x) => f.write_str(&format_float(*x)),
            Scalar::Complex(z) => write!(f, "{}", Expr::from_complex(*z)),
            Scalar::Symbolic(e) => write!(f, "{e}"),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::zero()
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self { Scalar::integer(n as i64) }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self { Scalar::integer(n) }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self { Scalar::Approx(x) }
}

impl From<BigRational> for Scalar {
    fn from(r: BigRational) -> Self { Scalar::Exact(r) }
}

impl From<Complex64> for Scalar {
    fn from(z: Complex64) -> Self { Scalar::from_complex(z) }
}

impl From<Expr> for Scalar {
    fn from(e: Expr) -> Self { Scalar::from_expr(e) }
}

impl std::str::FromStr for Scalar {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scalar::parse(s)
    }
}

impl Add for &Scalar {
    type Output = Scalar;
    fn add(self, rhs: &Scalar) -> Scalar { Scalar::add(self, rhs) }
}

impl Sub for &Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &Scalar) -> Scalar { Scalar::sub(self, rhs) }
}

impl Mul for &Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &Scalar) -> Scalar { Scalar::mul(self, rhs) }
}

impl Neg for &Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar { Scalar::neg(self) }
}

impl Ring for Scalar {
    fn zero() -> Self { Scalar::zero() }
    fn one() -> Self { Scalar::one() }
    fn add(&self, other: &Self) -> Self { Scalar::add(self, other) }
    fn sub(&self, other: &Self) -> Self { Scalar::sub(self, other) }
    fn mul(&self, other: &Self) -> Self { Scalar::mul(self, other) }
    fn neg(&self) -> Self { Scalar::neg(self) }
    fn is_zero(&self) -> bool { Scalar::is_zero_within(self, 0.0) }
}

// ----- serde -----

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Exact(r) if r.is_integer() => match r.numer().to_i64() {
                Some(n) => serializer.serialize_i64(n),
                None => serializer.serialize_str(&r.to_string()),
            },
            Scalar::Approx(x) if x.is_finite() => serializer.serialize_f64(*x),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a scalar expression string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
        Ok(Scalar::integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
        Ok(Scalar::Exact(BigRational::from_integer(BigInt::from(v))))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
        Ok(Scalar::Approx(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
        Scalar::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }
}
