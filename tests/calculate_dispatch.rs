use matrixcalc::core::calculate::{respond, respond_property};
use matrixcalc::core::{calculate, Operation, Outcome, Request};
use matrixcalc::{Matrix, Scalar};
use serde_json::{json, Value};

fn result(request: Value) -> Value {
    let reply = respond(&request);
    assert!(reply.get("error").is_none(), "unexpected error: {reply}");
    reply["result"].clone()
}

fn error(request: Value) -> String {
    let reply = respond(&request);
    reply["error"].as_str().unwrap_or_else(|| panic!("expected error, got {reply}")).to_string()
}

#[test]
fn every_operation_dispatches() {
    let a = json!([[1, 2], [3, 4]]);
    let b = json!([[5, 6], [7, 8]]);
    assert_eq!(
        result(json!({ "operation": "add", "matrixA": a, "matrixB": b })),
        json!([[6.0, 8.0], [10.0, 12.0]])
    );
    assert_eq!(
        result(json!({ "operation": "subtract", "matrixA": b, "matrixB": a })),
        json!([[4.0, 4.0], [4.0, 4.0]])
    );
    assert_eq!(
        result(json!({ "operation": "multiply", "matrixA": a, "matrixB": b })),
        json!([[19.0, 22.0], [43.0, 50.0]])
    );
    assert_eq!(
        result(json!({ "operation": "scalar_multiply", "matrixA": [[2, 4]], "scalar": "1/2" })),
        json!([[1.0, 2.0]])
    );
    assert_eq!(
        result(json!({ "operation": "transpose", "matrixA": [[1, 2, 3]] })),
        json!([[1.0], [2.0], [3.0]])
    );
    assert_eq!(result(json!({ "operation": "determinant", "matrixA": a })), json!(-2.0));
    assert_eq!(
        result(json!({ "operation": "inverse", "matrixA": a })),
        json!([[-2.0, 1.0], [1.5, -0.5]])
    );
    assert_eq!(
        result(json!({ "operation": "eigenvalues", "matrixA": [[2, 0], [0, 3]] })),
        json!([2.0, 3.0])
    );
    assert_eq!(
        result(json!({ "operation": "characteristic", "matrixA": a })),
        json!("X**2 - 5*X - 2")
    );
    assert_eq!(
        result(json!({ "operation": "power", "matrixA": [[1, 1], [1, 0]], "scalar": 2 })),
        json!([[2.0, 1.0], [1.0, 1.0]])
    );
    assert_eq!(result(json!({ "operation": "trace", "matrixA": a })), json!(5.0));
}

#[test]
fn floats_and_exact_tokens_mix_in_requests() {
    let got = result(json!({ "operation": "add", "matrixA": [[0.5, "1/4"]], "matrixB": [["sqrt(4)", 1]] }));
    assert_eq!(got, json!([[2.5, 1.25]]));
}

#[test]
fn failures_become_error_replies() {
    assert!(error(json!({ "operation": "cube", "matrixA": [[1]] })).starts_with("Unknown Operation"));
    assert!(error(json!({ "operation": "inverse", "matrixA": [[1, 2], [2, 4]] })).starts_with("Singular Matrix"));
    assert!(error(json!({ "operation": "trace", "matrixA": [[1, 2]] })).starts_with("Not Square"));
    assert!(error(json!({ "operation": "multiply", "matrixA": [[1, 2]], "matrixB": [[1, 2]] }))
        .starts_with("Dimension Mismatch"));
    assert!(error(json!({ "operation": "power", "matrixA": [[-1, 1], [0, -1]], "scalar": 0.5 }))
        .starts_with("Undefined Power"));
    assert!(!error(json!({ "operation": "trace", "matrixA": [[1, 2], [3]] })).is_empty());
    assert!(!error(json!({ "operation": "trace", "matrixA": [["2$"]] })).is_empty());
    assert!(!error(json!({ "operation": "trace" })).is_empty());
}

#[test]
fn property_checks_answer_in_words() {
    let cases = [
        ("symmetric", json!([[1, 2], [2, 1]]), "Matrix is symmetric"),
        ("orthogonal", json!([[0, 1], [1, 0]]), "Matrix is orthogonal"),
        ("invertible", json!([[1, 2], [2, 4]]), "Matrix is not invertible"),
        ("diagonalizable", json!([[1, 1], [0, 1]]), "Matrix is not diagonalizable"),
        ("symmetric", json!([[1, 2, 3]]), "Matrix is not symmetric"),
    ];
    for (property, matrix, message) in cases {
        let reply = respond_property(&json!({ "property": property, "matrixA": matrix }));
        assert_eq!(reply, json!({ "result": message }), "{property}");
    }
    let reply = respond_property(&json!({ "property": "square", "matrixA": [[1]] }));
    assert!(reply["error"].as_str().unwrap().starts_with("Unknown Property"));
}

#[test]
fn outcomes_keep_exact_values() {
    let request = Request {
        operation: Operation::Power.name().to_string(),
        matrix_a: Matrix::from_grid(&[vec![4, 0], vec![0, 9]]).unwrap(),
        matrix_b: None,
        scalar: Some(Scalar::parse("1/2").unwrap()),
    };
    let outcome = calculate(&request).unwrap();
    assert_eq!(outcome, Outcome::Matrix(Matrix::from_grid(&[vec![2, 0], vec![0, 3]]).unwrap()));
    assert_eq!(outcome.to_string(), "a11 = 2  a12 = 0\na21 = 0  a22 = 3");

    let request = Request {
        operation: "eigenvalues".to_string(),
        matrix_a: Matrix::from_grid(&[vec![1, 2], vec![3, 4]]).unwrap(),
        matrix_b: None,
        scalar: None,
    };
    let values = calculate(&request).unwrap();
    assert!(matches!(values, Outcome::Scalars(ref list) if list.len() == 2));
}
