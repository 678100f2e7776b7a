use matrixcalc::core::{MatrixError, PowerStrategy};
use matrixcalc::{Matrix, Scalar};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn m(grid: &[&[i64]]) -> Matrix {
    Matrix::from_grid(&grid.iter().map(|r| r.to_vec()).collect::<Vec<_>>()).expect("valid grid")
}

fn close(a: &Matrix, b: &Matrix, eps: f64) -> bool {
    a.shape() == b.shape()
        && a.elements().zip(b.elements()).all(|(x, y)| {
            let (x, y): (Complex64, Complex64) = (x.to_complex().unwrap(), y.to_complex().unwrap());
            (x - y).norm() <= eps
        })
}

#[test]
fn zero_exponent_gives_identity() {
    for a in [m(&[&[1, 2], &[2, 4]]), m(&[&[0, 1], &[0, 0]]), m(&[&[5]])] {
        let n = a.rows();
        assert_eq!(a.power(&Scalar::zero()).unwrap(), Matrix::identity(n));
        assert_eq!(a.power(&Scalar::Approx(0.0)).unwrap(), Matrix::identity(n));
    }
}

#[test]
fn integer_exponents_add() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..6 {
        let grid: Vec<Vec<i64>> = (0..3).map(|_| (0..3).map(|_| rng.gen_range(-3..=3)).collect()).collect();
        let a = Matrix::from_grid(&grid).unwrap();
        for p in 0..4 {
            for q in 0..4 {
                let lhs = a.power(&Scalar::integer(p + q)).unwrap();
                let rhs = a
                    .power(&Scalar::integer(p))
                    .unwrap()
                    .multiply(&a.power(&Scalar::integer(q)).unwrap())
                    .unwrap();
                assert_eq!(lhs, rhs, "p = {p}, q = {q}");
            }
        }
    }
}

#[test]
fn negative_integer_exponents_invert() {
    let a = m(&[&[2, 1], &[1, 1]]);
    assert_eq!(a.power(&Scalar::integer(-1)).unwrap(), a.inverse().unwrap());
    let product = a
        .power(&Scalar::integer(-3))
        .unwrap()
        .multiply(&a.power(&Scalar::integer(3)).unwrap())
        .unwrap();
    assert_eq!(product, Matrix::identity(2));
}

#[test]
fn negative_powers_of_singular_matrices_fail() {
    let singular = m(&[&[1, 2], &[2, 4]]);
    assert!(matches!(singular.power(&Scalar::integer(-2)), Err(MatrixError::Singular(_))));
    assert!(matches!(singular.power(&Scalar::Approx(-0.5)), Err(MatrixError::Singular(_))));
}

#[test]
fn square_root_of_diagonal_stays_exact() {
    let a = m(&[&[4, 0], &[0, 9]]);
    let half = Scalar::ratio(1, 2).unwrap();
    assert_eq!(a.power(&half).unwrap(), m(&[&[2, 0], &[0, 3]]));
}

#[test]
fn diagonalized_square_root_squares_back() {
    let a = m(&[&[2, 1], &[1, 2]]);
    let half = Scalar::ratio(1, 2).unwrap();
    assert!(matches!(a.power_strategy(&half).unwrap(), PowerStrategy::Diagonalized(_)));
    let root = a.power(&half).unwrap();
    let squared = root.multiply(&root).unwrap().evaluate().unwrap();
    assert!(close(&squared, &a, 1e-9));
}

#[test]
fn fractional_exponents_add() {
    let a = m(&[&[3, 1], &[1, 2]]);
    let p = Scalar::Approx(0.3);
    let q = Scalar::Approx(0.7);
    let lhs = a.power(&p).unwrap().multiply(&a.power(&q).unwrap()).unwrap();
    assert!(close(&lhs, &a, 1e-9));
}

#[test]
fn defective_matrices_use_the_logarithm() {
    let jordan = m(&[&[2, 1], &[0, 2]]);
    let third = Scalar::ratio(1, 3).unwrap();
    assert_eq!(jordan.power_strategy(&third).unwrap(), PowerStrategy::LogExpFallback);
    let root = jordan.power(&third).unwrap();
    let cubed = root.power(&Scalar::integer(3)).unwrap();
    assert!(close(&cubed, &jordan, 1e-7));

    let unipotent = m(&[&[1, 1], &[0, 1]]);
    let half = unipotent.power(&Scalar::Approx(0.5)).unwrap();
    let expected = Matrix::from_grid(&[vec![1.0, 0.5], vec![0.0, 1.0]]).unwrap();
    assert!(close(&half, &expected, 1e-9));
}

#[test]
fn rotation_half_power_is_half_the_angle() {
    let quarter_turn = m(&[&[0, -1], &[1, 0]]);
    let half = quarter_turn.power(&Scalar::Approx(0.5)).unwrap();
    let c = std::f64::consts::FRAC_1_SQRT_2;
    let expected = Matrix::from_grid(&[vec![c, -c], vec![c, c]]).unwrap();
    assert!(close(&half, &expected, 1e-9));
}

#[test]
fn no_principal_logarithm_is_undefined() {
    let a = m(&[&[-1, 1], &[0, -1]]);
    let half = Scalar::Approx(0.5);
    assert!(matches!(a.power_strategy(&half).unwrap(), PowerStrategy::Undefined(_)));
    assert!(matches!(a.power(&half), Err(MatrixError::UndefinedPower(_))));
}

#[test]
fn power_requires_square() {
    let wide = m(&[&[1, 2, 3]]);
    assert!(matches!(wide.power(&Scalar::integer(2)), Err(MatrixError::NotSquare(_))));
}

#[test]
fn integral_float_exponents_match_integer_ones() {
    let nilpotent = m(&[&[0, 1], &[0, 0]]);
    assert!(close(&nilpotent.power(&Scalar::Approx(1.0)).unwrap(), &nilpotent, 1e-12));
    assert!(close(&nilpotent.power(&Scalar::Approx(2.0)).unwrap(), &Matrix::zeros(2, 2), 1e-12));

    let jordan = m(&[&[-1, 1], &[0, -1]]);
    assert!(close(&jordan.power(&Scalar::Approx(1.0)).unwrap(), &jordan, 1e-12));
    let squared = jordan.power(&Scalar::Approx(2.0)).unwrap();
    assert!(close(&squared, &m(&[&[1, -2], &[0, 1]]), 1e-12));
    assert!(close(&squared, &jordan.power(&Scalar::integer(2)).unwrap(), 1e-12));
}

#[test]
fn float_and_exact_integer_exponents_agree() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut checked = 0;
    while checked < 8 {
        let grid: Vec<Vec<i64>> = (0..3).map(|_| (0..3).map(|_| rng.gen_range(-3..=3)).collect()).collect();
        let a = Matrix::from_grid(&grid).unwrap();
        if !a.is_invertible() {
            continue;
        }
        for k in -2..=3 {
            let exact = a.power(&Scalar::integer(k)).unwrap().evaluate().unwrap();
            let floating = a.power(&Scalar::Approx(k as f64)).unwrap();
            assert!(close(&exact, &floating, 1e-9), "k = {k}");
        }
        checked += 1;
    }
}
