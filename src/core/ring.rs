//! Commutative ring abstraction shared by the scalar determinant and the
//! characteristic polynomial, which is the determinant of `X*I - A` over
//! polynomial entries.

pub trait Ring: Clone {
    fn zero() -> Self;
    fn one() -> Self;
    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn is_zero(&self) -> bool;
}

/// Square grid with row `skip_row` and column `skip_col` removed.
pub fn minor<T: Clone>(grid: &[Vec<T>], skip_row: usize, skip_col: usize) -> Vec<Vec<T>> {
    grid.iter()
        .enumerate()
        .filter(|(r, _)| *r != skip_row)
        .map(|(_, row)| {
            row.iter()
                .enumerate()
                .filter(|(c, _)| *c != skip_col)
                .map(|(_, v)| v.clone())
                .collect()
        })
        .collect()
}

/// Cofactor expansion along the first row. The empty grid has determinant 1.
pub fn laplace_determinant<T: Ring>(grid: &[Vec<T>]) -> T {
    match grid.len() {
        0 => T::one(),
        1 => grid[0][0].clone(),
        2 => grid[0][0].mul(&grid[1][1]).sub(&grid[0][1].mul(&grid[1][0])),
        n => {
            let mut acc = T::zero();
            for col in 0..n {
                let entry = &grid[0][col];
                if entry.is_zero() {
                    continue;
                }
                let term = entry.mul(&laplace_determinant(&minor(grid, 0, col)));
                acc = if col % 2 == 0 { acc.add(&term) } else { acc.sub(&term) };
            }
            acc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Ring for i64 {
        fn zero() -> Self { 0 }
        fn one() -> Self { 1 }
        fn add(&self, o: &Self) -> Self { self + o }
        fn sub(&self, o: &Self) -> Self { self - o }
        fn mul(&self, o: &Self) -> Self { self * o }
        fn neg(&self) -> Self { -self }
        fn is_zero(&self) -> bool { *self == 0 }
    }

    #[test]
    fn expands_three_by_three() {
        let g: Vec<Vec<i64>> = vec![vec![2, 0, 1], vec![1, 3, 2], vec![1, 1, 2]];
        assert_eq!(laplace_determinant(&g), 6);
    }

    #[test]
    fn minor_drops_row_and_column() {
        let g = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]];
        assert_eq!(minor(&g, 1, 1), vec![vec![1, 3], vec![7, 9]]);
    }
}
