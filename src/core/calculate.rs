//! Name-based dispatch onto the matrix engine, with floating-point JSON
//! rendering of the results.
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::error::{MatrixError, MatrixResult};
use crate::core::matrix::Matrix;
use crate::core::polynomial::Polynomial;
use crate::core::scalar::Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    ScalarMultiply,
    Transpose,
    Determinant,
    Inverse,
    Eigenvalues,
    Characteristic,
    Power,
    Trace,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::ScalarMultiply,
        Operation::Transpose,
        Operation::Determinant,
        Operation::Inverse,
        Operation::Eigenvalues,
        Operation::Characteristic,
        Operation::Power,
        Operation::Trace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::ScalarMultiply => "scalar_multiply",
            Operation::Transpose => "transpose",
            Operation::Determinant => "determinant",
            Operation::Inverse => "inverse",
            Operation::Eigenvalues => "eigenvalues",
            Operation::Characteristic => "characteristic",
            Operation::Power => "power",
            Operation::Trace => "trace",
        }
    }
}

impl FromStr for Operation {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| MatrixError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Symmetric,
    Orthogonal,
    Invertible,
    Diagonalizable,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Property::Symmetric => "symmetric",
            Property::Orthogonal => "orthogonal",
            Property::Invertible => "invertible",
            Property::Diagonalizable => "diagonalizable",
        }
    }
}

impl FromStr for Property {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symmetric" => Ok(Property::Symmetric),
            "orthogonal" => Ok(Property::Orthogonal),
            "invertible" => Ok(Property::Invertible),
            "diagonalizable" => Ok(Property::Diagonalizable),
            other => Err(MatrixError::UnknownProperty(other.to_string())),
        }
    }
}

/// One `/calculate`-style request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub operation: String,
    #[serde(rename = "matrixA")]
    pub matrix_a: Matrix,
    #[serde(rename = "matrixB", default)]
    pub matrix_b: Option<Matrix>,
    #[serde(default)]
    pub scalar: Option<Scalar>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PropertyRequest {
    pub property: String,
    #[serde(rename = "matrixA")]
    pub matrix_a: Matrix,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Matrix(Matrix),
    Scalar(Scalar),
    Scalars(Vec<Scalar>),
    Polynomial(Polynomial),
}

fn scalar_json(s: &Scalar) -> MatrixResult<Value> {
    Ok(match s.evaluate()? {
        Scalar::Complex(z) => json!({ "re": z.re, "im": z.im }),
        other => json!(other.to_f64()?),
    })
}

impl Outcome {
    /// Floating-point rendering: nested arrays for matrices, arrays for
    /// scalar lists, numbers for scalars, the rendered string for
    /// polynomials.
    pub fn to_json(&self) -> MatrixResult<Value> {
        match self {
            Outcome::Matrix(m) => m
                .data()
                .iter()
                .map(|row| row.iter().map(scalar_json).collect::<MatrixResult<Vec<_>>>().map(Value::from))
                .collect::<MatrixResult<Vec<_>>>()
                .map(Value::from),
            Outcome::Scalar(s) => scalar_json(s),
            Outcome::Scalars(list) => list.iter().map(scalar_json).collect::<MatrixResult<Vec<_>>>().map(Value::from),
            Outcome::Polynomial(p) => Ok(Value::String(p.to_string())),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matrix(m) => write!(f, "{m}"),
            Outcome::Scalar(s) => write!(f, "{s}"),
            Outcome::Scalars(list) => {
                let shown: Vec<String> = list.iter().map(Scalar::to_string).collect();
                write!(f, "[{}]", shown.join(", "))
            }
            Outcome::Polynomial(p) => write!(f, "{p}"),
        }
    }
}

fn operand<'a, T>(value: &'a Option<T>, what: &str, op: Operation) -> MatrixResult<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| MatrixError::MissingOperand(format!("{op} requires {what}")))
}

pub fn calculate(request: &Request) -> MatrixResult<Outcome> {
    let op: Operation = request.operation.parse()?;
    let a = &request.matrix_a;
    let b = || operand(&request.matrix_b, "matrixB", op);
    Ok(match op {
        Operation::Add => Outcome::Matrix(a.add(b()?)?),
        Operation::Subtract => Outcome::Matrix(a.subtract(b()?)?),
        Operation::Multiply => Outcome::Matrix(a.multiply(b()?)?),
        Operation::ScalarMultiply => Outcome::Matrix(a.scalar_multiply(operand(&request.scalar, "a scalar", op)?)),
        Operation::Transpose => Outcome::Matrix(a.transpose()),
        Operation::Determinant => Outcome::Scalar(a.determinant()?),
        Operation::Inverse => Outcome::Matrix(a.inverse()?),
        Operation::Eigenvalues => Outcome::Scalars(a.eigenvalues(true)?),
        Operation::Characteristic => Outcome::Polynomial(a.characteristic_equation()?),
        Operation::Power => Outcome::Matrix(a.power(operand(&request.scalar, "a power value", op)?)?),
        Operation::Trace => Outcome::Scalar(a.trace()?),
    })
}

/// Predicate result plus its user-facing message.
pub fn check_property(property: Property, matrix: &Matrix) -> (bool, String) {
    let holds = match property {
        Property::Symmetric => matrix.is_symmetric(),
        Property::Orthogonal => matrix.is_orthogonal(),
        Property::Invertible => matrix.is_invertible(),
        Property::Diagonalizable => matrix.is_diagonalizable(),
    };
    let message = if holds {
        format!("Matrix is {}", property.name())
    } else {
        format!("Matrix is not {}", property.name())
    };
    (holds, message)
}

/// Full JSON exchange: `{"result": ...}` on success, `{"error": ...}` otherwise.
pub fn respond(request: &Value) -> Value {
    let outcome = serde_json::from_value::<Request>(request.clone())
        .map_err(|e| e.to_string())
        .and_then(|req| calculate(&req).and_then(|o| o.to_json()).map_err(|e| e.to_string()));
    match outcome {
        Ok(result) => json!({ "result": result }),
        Err(error) => json!({ "error": error }),
    }
}

pub fn respond_property(request: &Value) -> Value {
    let outcome = serde_json::from_value::<PropertyRequest>(request.clone())
        .map_err(|e| e.to_string())
        .and_then(|req| {
            let property: Property = req.property.parse().map_err(|e: MatrixError| e.to_string())?;
            Ok(check_property(property, &req.matrix_a).1)
        });
    match outcome {
        Ok(message) => json!({ "result": message }),
        Err(error) => json!({ "error": error }),
    }
}
