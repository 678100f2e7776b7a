//! `matrixcalc calc <OP>`: one engine operation, printed as JSON or exactly.

use std::path::Path;

use anyhow::{bail, Result};
use serde_json::json;

use matrixcalc::core::registry::Registry;
use matrixcalc::core::{calculate, Outcome, Request, Scalar};

use super::resolve_matrix;

pub struct CalcArgs {
    pub operation: String,
    pub a: String,
    pub b: Option<String>,
    pub scalar: Option<String>,
    pub exact: bool,
    pub store: Option<String>,
}

fn round_to(s: &Scalar, decimals: usize) -> Scalar {
    let scale = 10f64.powi(decimals as i32);
    match s {
        Scalar::Approx(x) => Scalar::Approx((x * scale).round() / scale),
        other => other.clone(),
    }
}

fn rounded(outcome: Outcome, decimals: usize) -> Outcome {
    match outcome {
        Outcome::Matrix(m) => Outcome::Matrix(m.map(|x| round_to(x, decimals))),
        Outcome::Scalar(s) => Outcome::Scalar(round_to(&s, decimals)),
        Outcome::Scalars(list) => Outcome::Scalars(list.iter().map(|x| round_to(x, decimals)).collect()),
        other => other,
    }
}

pub fn main(args: CalcArgs, registry_path: &Path, precision: Option<usize>) -> Result<()> {
    let mut registry = Registry::open(registry_path)?;
    let request = Request {
        operation: args.operation,
        matrix_a: resolve_matrix(&args.a, &registry)?,
        matrix_b: args.b.as_deref().map(|b| resolve_matrix(b, &registry)).transpose()?,
        scalar: args.scalar.as_deref().map(Scalar::parse).transpose()?,
    };
    let outcome = calculate(&request)?;

    if args.exact {
        let shown = match precision {
            Some(p) => rounded(outcome.clone(), p),
            None => outcome.clone(),
        };
        println!("{shown}");
    } else {
        println!("{}", json!({ "result": outcome.to_json()? }));
    }

    if let Some(name) = args.store {
        let Outcome::Matrix(m) = outcome else {
            bail!("only matrix results can be stored");
        };
        registry.store_result(&name, m);
        registry.save(registry_path)?;
    }
    Ok(())
}
