//! Symbolic expression trees backing `Scalar::Symbolic`.
//!
//! Every `Expr` built through the constructors on this type is kept in a
//! canonical form: sums and products are flattened, numeric parts folded,
//! like terms collected, equal bases merged, and products of sums
//! distributed. That canonical form is what makes structural zero tests
//! (`x*y - y*x`) work without a full computer-algebra system.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::core::error::{MatrixError, MatrixResult};

/// Largest integer exponent for which `(a + b)^n` is expanded.
const MAX_EXPANSION: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    Pi,
    E,
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Ln,
    Sin,
    Cos,
    Tan,
    Abs,
}

impl Func {
    pub fn name(&self) -> &'static str {
        match self {
            Func::Ln => "log",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Abs => "Abs",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Rational(BigRational),
    Float(f64),
    Const(Constant),
    Symbol(String),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

pub(crate) fn rational_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or_else(|| {
        let n = r.numer().to_f64().unwrap_or(f64::NAN);
        let d = r.denom().to_f64().unwrap_or(f64::NAN);
        n / d
    })
}

/// Exact `base^exp` for an integer exponent. `None` for `0^negative` or
/// exponents too large to materialize.
pub(crate) fn rational_powi(base: &BigRational, exp: &BigInt) -> Option<BigRational> {
    let k = exp.abs().to_usize()?;
    if k > 4096 {
        return None;
    }
    let p = num_traits::pow(base.clone(), k);
    if exp.is_negative() {
        if p.is_zero() {
            None
        } else {
            Some(p.recip())
        }
    } else {
        Some(p)
    }
}

fn exact_root(n: &BigInt, q: u32) -> Option<BigInt> {
    if n.is_negative() {
        return None;
    }
    let r = n.nth_root(q);
    if num_traits::pow(r.clone(), q as usize) == *n {
        Some(r)
    } else {
        None
    }
}

/// Numeric part of a sum or product while it is being folded.
#[derive(Debug, Clone)]
enum Number {
    Rat(BigRational),
    Flt(f64),
}

impl Number {
    fn zero() -> Self { Number::Rat(BigRational::zero()) }
    fn one() -> Self { Number::Rat(BigRational::one()) }

    fn of(expr: &Expr) -> Option<Number> {
        match expr {
            Expr::Rational(r) => Some(Number::Rat(r.clone())),
            Expr::Float(f) => Some(Number::Flt(*f)),
            _ => None,
        }
    }

    fn to_f64(&self) -> f64 {
        match self {
            Number::Rat(r) => rational_to_f64(r),
            Number::Flt(f) => *f,
        }
    }

    fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rat(a), Number::Rat(b)) => Number::Rat(a + b),
            _ => Number::Flt(self.to_f64() + other.to_f64()),
        }
    }

    fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rat(a), Number::Rat(b)) => Number::Rat(a * b),
            _ => Number::Flt(self.to_f64() * other.to_f64()),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Rat(r) => r.is_zero(),
            Number::Flt(f) => *f == 0.0,
        }
    }

    fn is_exact_one(&self) -> bool {
        matches!(self, Number::Rat(r) if r.is_one())
    }

    fn is_float(&self) -> bool {
        matches!(self, Number::Flt(_))
    }

    fn into_expr(self) -> Expr {
        match self {
            Number::Rat(r) => Expr::Rational(r),
            Number::Flt(f) => Expr::Float(f),
        }
    }
}

impl Expr {
    pub fn zero() -> Expr { Expr::Rational(BigRational::zero()) }
    pub fn one() -> Expr { Expr::Rational(BigRational::one()) }
    pub fn integer(n: i64) -> Expr { Expr::Rational(BigRational::from_integer(BigInt::from(n))) }
    pub fn rational(r: BigRational) -> Expr { Expr::Rational(r) }
    pub fn float(f: f64) -> Expr { Expr::Float(f) }
    pub fn constant(c: Constant) -> Expr { Expr::Const(c) }

    pub fn symbol(name: &str) -> Expr { Expr::Symbol(name.to_string()) }

    pub fn from_complex(c: Complex64) -> Expr {
        if c.im == 0.0 {
            return Expr::Float(c.re);
        }
        let imaginary = normalize_mul(vec![Expr::Float(c.im), Expr::Const(Constant::I)]);
        normalize_add(vec![Expr::Float(c.re), imaginary])
    }

    pub fn add(a: Expr, b: Expr) -> Expr { normalize_add(vec![a, b]) }
    pub fn mul(a: Expr, b: Expr) -> Expr { normalize_mul(vec![a, b]) }
    pub fn neg(a: Expr) -> Expr { normalize_mul(vec![Expr::integer(-1), a]) }
    pub fn sub(a: Expr, b: Expr) -> Expr { Expr::add(a, Expr::neg(b)) }
    pub fn pow(base: Expr, exp: Expr) -> Expr { normalize_pow(base, exp) }
    pub fn div(a: Expr, b: Expr) -> Expr { Expr::mul(a, Expr::pow(b, Expr::integer(-1))) }
    pub fn sqrt(a: Expr) -> Expr {
        Expr::pow(a, Expr::Rational(BigRational::new(BigInt::one(), BigInt::from(2))))
    }
    pub fn exp(a: Expr) -> Expr { normalize_pow(Expr::Const(Constant::E), a) }
    pub fn call(func: Func, arg: Expr) -> Expr { normalize_call(func, arg) }

    /// Rebuild the whole tree through the canonicalizing constructors.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Add(terms) => normalize_add(terms.iter().map(Expr::simplify).collect()),
            Expr::Mul(factors) => normalize_mul(factors.iter().map(Expr::simplify).collect()),
            Expr::Pow(b, e) => normalize_pow(b.simplify(), e.simplify()),
            Expr::Call(func, arg) => normalize_call(*func, arg.simplify()),
            other => other.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Expr::Rational(r) => r.is_zero(),
            Expr::Float(f) => *f == 0.0,
            _ => false,
        }
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Symbol(name) => {
                out.insert(name.clone());
            }
            Expr::Add(items) | Expr::Mul(items) => items.iter().for_each(|e| e.collect_symbols(out)),
            Expr::Pow(b, e) => {
                b.collect_symbols(out);
                e.collect_symbols(out);
            }
            Expr::Call(_, arg) => arg.collect_symbols(out),
            _ => {}
        }
    }

    /// True when the expression has no free symbols.
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Symbol(_) => false,
            Expr::Add(items) | Expr::Mul(items) => items.iter().all(Expr::is_constant),
            Expr::Pow(b, e) => b.is_constant() && e.is_constant(),
            Expr::Call(_, arg) => arg.is_constant(),
            _ => true,
        }
    }

    pub fn contains_float(&self) -> bool {
        match self {
            Expr::Float(_) => true,
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(Expr::contains_float),
            Expr::Pow(b, e) => b.contains_float() || e.contains_float(),
            Expr::Call(_, arg) => arg.contains_float(),
            _ => false,
        }
    }

    /// Numeric value on the principal branch. Fails on free symbols.
    pub fn eval(&self) -> MatrixResult<Complex64> {
        Ok(match self {
            Expr::Rational(r) => Complex64::new(rational_to_f64(r), 0.0),
            Expr::Float(f) => Complex64::new(*f, 0.0),
            Expr::Const(Constant::Pi) => Complex64::new(std::f64::consts::PI, 0.0),
            Expr::Const(Constant::E) => Complex64::new(std::f64::consts::E, 0.0),
            Expr::Const(Constant::I) => Complex64::new(0.0, 1.0),
            Expr::Symbol(name) => return Err(MatrixError::non_numeric(name)),
            Expr::Add(terms) => {
                let mut acc = Complex64::new(0.0, 0.0);
                for t in terms {
                    acc += t.eval()?;
                }
                acc
            }
            Expr::Mul(factors) => {
                let mut acc = Complex64::new(1.0, 0.0);
                for f in factors {
                    acc *= f.eval()?;
                }
                acc
            }
            Expr::Pow(b, e) => complex_pow(b.eval()?, e.eval()?),
            Expr::Call(func, arg) => {
                let z = arg.eval()?;
                match func {
                    Func::Ln => z.ln(),
                    Func::Sin => z.sin(),
                    Func::Cos => z.cos(),
                    Func::Tan => z.tan(),
                    Func::Abs => Complex64::new(z.norm(), 0.0),
                }
            }
        })
    }

    fn split_coefficient(&self) -> (Number, Expr) {
        if let Expr::Mul(factors) = self {
            if let Some(n) = factors.first().and_then(Number::of) {
                let rest: Vec<Expr> = factors[1..].to_vec();
                let rest = if rest.len() == 1 { rest.into_iter().next().unwrap_or_else(Expr::one) } else { Expr::Mul(rest) };
                return (n, rest);
            }
        }
        (Number::one(), self.clone())
    }

    fn base_and_exponent(self) -> (Expr, Expr) {
        match self {
            Expr::Pow(b, e) => (*b, *e),
            other => (other, Expr::one()),
        }
    }

    /// `k` when the expression is `k*pi` for a rational `k`.
    fn pi_multiple(&self) -> Option<BigRational> {
        match self {
            Expr::Const(Constant::Pi) => Some(BigRational::one()),
            Expr::Mul(f) if f.len() == 2 && f[1] == Expr::Const(Constant::Pi) => f[0].as_rational().cloned(),
            _ => None,
        }
    }
}

pub(crate) fn complex_pow(base: Complex64, exp: Complex64) -> Complex64 {
    if exp.im == 0.0 && base.im == 0.0 {
        if base.re >= 0.0 {
            return Complex64::new(base.re.powf(exp.re), 0.0);
        }
        if exp.re.fract() == 0.0 && exp.re.abs() < i32::MAX as f64 {
            return Complex64::new(base.re.powi(exp.re as i32), 0.0);
        }
    }
    if base.norm() == 0.0 {
        return if exp.re > 0.0 {
            Complex64::new(0.0, 0.0)
        } else {
            Complex64::new(f64::INFINITY, 0.0)
        };
    }
    base.powc(exp)
}

fn scale(coeff: Number, rest: Expr) -> Expr {
    if coeff.is_exact_one() {
        return rest;
    }
    match rest {
        Expr::Mul(mut factors) => {
            factors.insert(0, coeff.into_expr());
            Expr::Mul(factors)
        }
        other => Expr::Mul(vec![coeff.into_expr(), other]),
    }
}

fn normalize_add(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    for t in terms {
        match t {
            Expr::Add(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut constant = Number::zero();
    let mut saw_float = false;
    let mut like: BTreeMap<String, (Number, Expr)> = BTreeMap::new();
    for t in flat {
        if let Some(n) = Number::of(&t) {
            saw_float |= n.is_float();
            constant = constant.add(&n);
            continue;
        }
        let (coeff, rest) = t.split_coefficient();
        saw_float |= coeff.is_float();
        let key = rest.to_string();
        match like.get_mut(&key) {
            Some(entry) => entry.0 = entry.0.add(&coeff),
            None => {
                like.insert(key, (coeff, rest));
            }
        }
    }

    let mut out = Vec::new();
    if !constant.is_zero() {
        out.push(constant.into_expr());
    }
    for (_, (coeff, rest)) in like {
        if !coeff.is_zero() {
            out.push(scale(coeff, rest));
        }
    }
    match out.len() {
        0 if saw_float => Expr::Float(0.0),
        0 => Expr::zero(),
        1 => out.pop().unwrap_or_else(Expr::zero),
        _ => Expr::Add(out),
    }
}

fn normalize_mul(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for f in factors {
        match f {
            Expr::Mul(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut coeff = Number::one();
    let mut bases: BTreeMap<String, (Expr, Vec<Expr>)> = BTreeMap::new();
    for f in flat {
        if let Some(n) = Number::of(&f) {
            coeff = coeff.mul(&n);
            continue;
        }
        let (base, exp) = f.base_and_exponent();
        let key = base.to_string();
        bases.entry(key).or_insert_with(|| (base, Vec::new())).1.push(exp);
    }
    if coeff.is_zero() {
        return coeff.into_expr();
    }

    let mut rebuilt = Vec::new();
    let mut regroup = false;
    for (_, (base, exps)) in bases {
        let exp = normalize_add(exps);
        match normalize_pow(base, exp) {
            p @ (Expr::Rational(_) | Expr::Float(_)) => {
                if let Some(n) = Number::of(&p) {
                    coeff = coeff.mul(&n);
                }
            }
            Expr::Mul(inner) => {
                regroup = true;
                rebuilt.extend(inner);
            }
            other => rebuilt.push(other),
        }
    }
    if regroup {
        let mut all = vec![coeff.into_expr()];
        all.extend(rebuilt);
        return normalize_mul(all);
    }
    if coeff.is_zero() {
        return coeff.into_expr();
    }

    let sum_at = rebuilt.iter().position(|f| matches!(f, Expr::Add(_)));
    if let Some(Expr::Add(terms)) = sum_at.map(|pos| rebuilt.remove(pos)) {
        let mut others = vec![coeff.into_expr()];
        others.extend(rebuilt);
        let distributed = terms
            .into_iter()
            .map(|t| {
                let mut fs = others.clone();
                fs.push(t);
                normalize_mul(fs)
            })
            .collect();
        return normalize_add(distributed);
    }

    match rebuilt.len() {
        0 => coeff.into_expr(),
        1 if coeff.is_exact_one() => rebuilt.pop().unwrap_or_else(Expr::one),
        _ => {
            if coeff.is_exact_one() {
                Expr::Mul(rebuilt)
            } else {
                let mut fs = vec![coeff.into_expr()];
                fs.extend(rebuilt);
                Expr::Mul(fs)
            }
        }
    }
}

fn expand_product(a: &Expr, b: &Expr) -> Expr {
    let left: Vec<Expr> = match a {
        Expr::Add(t) => t.clone(),
        other => vec![other.clone()],
    };
    let right: Vec<Expr> = match b {
        Expr::Add(t) => t.clone(),
        other => vec![other.clone()],
    };
    let mut terms = Vec::with_capacity(left.len() * right.len());
    for l in &left {
        for r in &right {
            terms.push(normalize_mul(vec![l.clone(), r.clone()]));
        }
    }
    normalize_add(terms)
}

fn pow_rational(base: &BigRational, exp: &BigRational) -> Option<Expr> {
    if exp.is_integer() {
        return rational_powi(base, exp.numer()).map(Expr::Rational);
    }
    let q = exp.denom().to_u32()?;
    let p = exp.numer().clone();
    if base.is_zero() {
        return if p.is_positive() { Some(Expr::zero()) } else { None };
    }
    if base.is_negative() {
        // Principal branch: (-b)^(p/2) = b^(p/2) * I^p. Other roots stay unevaluated.
        if q == 2 {
            let magnitude = normalize_pow(Expr::Rational(-base.clone()), Expr::Rational(exp.clone()));
            let unit = normalize_pow(Expr::Const(Constant::I), Expr::Rational(BigRational::from_integer(p)));
            return Some(normalize_mul(vec![magnitude, unit]));
        }
        return None;
    }
    if let (Some(n), Some(d)) = (exact_root(base.numer(), q), exact_root(base.denom(), q)) {
        return rational_powi(&BigRational::new(n, d), &p).map(Expr::Rational);
    }
    let (whole, rest) = p.div_mod_floor(&BigInt::from(q));
    if !whole.is_zero() {
        let factor = rational_powi(base, &whole)?;
        let remainder = Expr::Pow(
            Box::new(Expr::Rational(base.clone())),
            Box::new(Expr::Rational(BigRational::new(rest, BigInt::from(q)))),
        );
        return Some(normalize_mul(vec![Expr::Rational(factor), remainder]));
    }
    None
}

fn normalize_pow(base: Expr, exp: Expr) -> Expr {
    match &exp {
        Expr::Rational(r) if r.is_zero() => return Expr::one(),
        Expr::Float(f) if *f == 0.0 => return Expr::Float(1.0),
        Expr::Rational(r) if r.is_one() => return base,
        _ => {}
    }

    match (&base, &exp) {
        (Expr::Rational(b), _) if b.is_one() => Expr::one(),
        (Expr::Rational(b), Expr::Rational(e)) => pow_rational(b, e)
            .unwrap_or_else(|| Expr::Pow(Box::new(base.clone()), Box::new(exp.clone()))),
        (Expr::Rational(_) | Expr::Float(_), Expr::Rational(_) | Expr::Float(_)) => {
            match (base.eval(), exp.eval()) {
                (Ok(b), Ok(e)) => Expr::from_complex(complex_pow(b, e)),
                _ => Expr::Pow(Box::new(base), Box::new(exp)),
            }
        }
        (Expr::Const(Constant::I), Expr::Rational(e)) if e.is_integer() => {
            match e.numer().mod_floor(&BigInt::from(4)).to_u8() {
                Some(0) => Expr::one(),
                Some(1) => Expr::Const(Constant::I),
                Some(2) => Expr::integer(-1),
                _ => normalize_mul(vec![Expr::integer(-1), Expr::Const(Constant::I)]),
            }
        }
        (Expr::Pow(inner, e1), Expr::Rational(e)) if e.is_integer() => {
            let combined = normalize_mul(vec![(**e1).clone(), exp.clone()]);
            normalize_pow((**inner).clone(), combined)
        }
        (Expr::Mul(factors), Expr::Rational(e)) if e.is_integer() => normalize_mul(
            factors
                .iter()
                .map(|f| normalize_pow(f.clone(), exp.clone()))
                .collect(),
        ),
        (Expr::Add(_), Expr::Rational(e))
            if e.is_integer() && e.numer().to_u32().is_some_and(|k| (2..=MAX_EXPANSION).contains(&k)) =>
        {
            let k = e.numer().to_u32().unwrap_or(1);
            let mut acc = base.clone();
            for _ in 1..k {
                acc = expand_product(&acc, &base);
            }
            acc
        }
        _ => Expr::Pow(Box::new(base), Box::new(exp)),
    }
}

fn normalize_call(func: Func, arg: Expr) -> Expr {
    if let Some(k) = arg.pi_multiple() {
        let two = BigInt::from(2);
        if k.is_integer() {
            let parity_even = k.numer().is_even();
            match func {
                Func::Sin | Func::Tan => return Expr::zero(),
                Func::Cos => return Expr::integer(if parity_even { 1 } else { -1 }),
                _ => {}
            }
        } else if *k.denom() == two {
            // k = m/2 with m odd: sin = ±1, cos = 0
            let m = k.numer().mod_floor(&BigInt::from(4));
            match func {
                Func::Sin => return Expr::integer(if m == BigInt::one() { 1 } else { -1 }),
                Func::Cos => return Expr::zero(),
                _ => {}
            }
        }
    }
    match (func, &arg) {
        (Func::Sin | Func::Tan, a) if a.is_zero() && !a.contains_float() => Expr::zero(),
        (Func::Cos, a) if a.is_zero() && !a.contains_float() => Expr::one(),
        (Func::Ln, Expr::Rational(r)) if r.is_one() => Expr::zero(),
        (Func::Ln, Expr::Const(Constant::E)) => Expr::one(),
        (Func::Abs, Expr::Rational(r)) => Expr::Rational(r.abs()),
        _ if arg.is_constant() && arg.contains_float() => {
            let call = Expr::Call(func, Box::new(arg));
            match call.eval() {
                Ok(z) => Expr::from_complex(z),
                Err(_) => call,
            }
        }
        _ => Expr::Call(func, Box::new(arg)),
    }
}

// ----- rendering -----

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

fn wrap(rendered: (String, u8), min: u8) -> String {
    if rendered.1 >= min {
        rendered.0
    } else {
        format!("({})", rendered.0)
    }
}

pub(crate) fn format_float(f: f64) -> String {
    format!("{f:?}")
}

fn half() -> BigRational {
    BigRational::new(BigInt::one(), BigInt::from(2))
}

impl Expr {
    fn render(&self) -> (String, u8) {
        match self {
            Expr::Rational(r) => {
                let s = r.to_string();
                let prec = if r.is_negative() {
                    PREC_ADD
                } else if r.is_integer() {
                    PREC_ATOM
                } else {
                    PREC_MUL
                };
                (s, prec)
            }
            Expr::Float(f) => (format_float(*f), if *f < 0.0 { PREC_ADD } else { PREC_ATOM }),
            Expr::Const(Constant::Pi) => ("pi".into(), PREC_ATOM),
            Expr::Const(Constant::E) => ("E".into(), PREC_ATOM),
            Expr::Const(Constant::I) => ("I".into(), PREC_ATOM),
            Expr::Symbol(name) => (name.clone(), PREC_ATOM),
            Expr::Call(func, arg) => (format!("{}({})", func.name(), arg.render().0), PREC_ATOM),
            Expr::Pow(b, e) => {
                if e.as_rational() == Some(&half()) {
                    return (format!("sqrt({})", b.render().0), PREC_ATOM);
                }
                if **b == Expr::Const(Constant::E) {
                    return (format!("exp({})", e.render().0), PREC_ATOM);
                }
                (format!("{}**{}", wrap(b.render(), PREC_ATOM), wrap(e.render(), PREC_ATOM)), PREC_POW)
            }
            Expr::Add(terms) => {
                let mut out = String::new();
                for (i, t) in terms.iter().enumerate() {
                    let s = t.render().0;
                    if i == 0 {
                        out.push_str(&s);
                    } else if let Some(stripped) = s.strip_prefix('-') {
                        out.push_str(" - ");
                        out.push_str(stripped);
                    } else {
                        out.push_str(" + ");
                        out.push_str(&s);
                    }
                }
                (out, PREC_ADD)
            }
            Expr::Mul(factors) => self.render_product(factors),
        }
    }

    fn render_product(&self, factors: &[Expr]) -> (String, u8) {
        let mut negative = false;
        let mut numer: Vec<String> = Vec::new();
        let mut denom: Vec<(String, u8)> = Vec::new();
        for (i, f) in factors.iter().enumerate() {
            match f {
                Expr::Rational(r) if i == 0 => {
                    negative = r.is_negative();
                    let n = r.numer().abs();
                    if !n.is_one() {
                        numer.push(n.to_string());
                    }
                    if !r.denom().is_one() {
                        denom.push((r.denom().to_string(), PREC_ATOM));
                    }
                }
                Expr::Float(x) if i == 0 => {
                    negative = *x < 0.0;
                    numer.push(format_float(x.abs()));
                }
                Expr::Pow(b, e) if e.as_rational().is_some_and(|r| r.is_negative()) => {
                    let flipped = e.as_rational().map(|r| -r.clone()).unwrap_or_else(BigRational::one);
                    let positive = if flipped.is_one() {
                        (**b).clone()
                    } else {
                        Expr::Pow(b.clone(), Box::new(Expr::Rational(flipped)))
                    };
                    denom.push(positive.render());
                }
                other => numer.push(wrap(other.render(), PREC_MUL + 1)),
            }
        }
        let mut s = if numer.is_empty() { "1".to_string() } else { numer.join("*") };
        if !denom.is_empty() {
            s.push('/');
            if denom.len() == 1 {
                s.push_str(&wrap(denom.remove(0), PREC_POW));
            } else {
                let inner: Vec<String> = denom.into_iter().map(|d| wrap(d, PREC_MUL + 1)).collect();
                s.push_str(&format!("({})", inner.join("*")));
            }
        }
        if negative {
            (format!("-{s}"), PREC_ADD)
        } else {
            (s, PREC_MUL)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render().0)
    }
}
