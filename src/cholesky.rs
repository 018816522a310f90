//! Incremental Cholesky factorization of the active-feature Gram matrix.
//!
//! The solver only ever changes its active set by one feature at a time, so
//! the factorization is maintained under single column insertions and
//! removals instead of being recomputed: an insertion costs one forward
//! substitution, a removal one sweep of Givens rotations.

use linfa::Float;
use ndarray::Array2;

use crate::error::{LarsError, Result};

/// Lower-triangular Cholesky factor `L` with `L·Lᵀ` equal to the Gram matrix
/// of the columns currently in the basis.
///
/// The capacity is fixed at construction; the caller bounds the basis by the
/// problem rank and never appends past it.
pub struct GramCholesky<F> {
    factor: Array2<F>,
    rank: usize,
}

impl<F: Float> GramCholesky<F> {
    /// An empty factorization able to hold up to `max_rank` basis columns.
    pub fn new(max_rank: usize) -> Self {
        GramCholesky {
            factor: Array2::zeros((max_rank, max_rank)),
            rank: 0,
        }
    }

    /// Number of columns currently factored.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Capacity chosen at construction.
    pub fn max_rank(&self) -> usize {
        self.factor.nrows()
    }

    /// Extend the factorization by one column.
    ///
    /// `products` holds the inner products of the entering column against
    /// every column already in the basis, in basis order, followed by the
    /// product of the column with itself.
    ///
    /// Fails with [`LarsError::IllConditioned`] when the new pivot is not
    /// safely positive, i.e. the entering column is linearly dependent on the
    /// basis; the factorization is left unchanged in that case.
    pub fn append(&mut self, products: &[F]) -> Result<()> {
        let r = self.rank;
        assert!(r < self.max_rank(), "basis exceeds factorization capacity");
        debug_assert_eq!(products.len(), r + 1);

        // forward substitution: the new row solves L[..r, ..r] l = products[..r]
        for i in 0..r {
            let mut sum = products[i];
            for k in 0..i {
                sum = sum - self.factor[[i, k]] * self.factor[[r, k]];
            }
            self.factor[[r, i]] = sum / self.factor[[i, i]];
        }

        let mut pivot = products[r];
        for k in 0..r {
            pivot = pivot - self.factor[[r, k]] * self.factor[[r, k]];
        }
        if !pivot.is_finite() || pivot <= F::epsilon() {
            for k in 0..r {
                self.factor[[r, k]] = F::zero();
            }
            return Err(LarsError::IllConditioned);
        }

        self.factor[[r, r]] = pivot.sqrt();
        self.rank += 1;
        Ok(())
    }

    /// Remove the basis column at `index`, restoring a valid factorization of
    /// the remaining columns.
    ///
    /// Deleting a row of `L` leaves the trailing block lower-Hessenberg; one
    /// plane rotation per trailing column brings it back to triangular form
    /// while preserving `L·Lᵀ`.
    pub fn remove(&mut self, index: usize) {
        let r = self.rank;
        assert!(index < r, "basis index out of range");

        for i in (index + 1)..r {
            for k in 0..=i {
                self.factor[[i - 1, k]] = self.factor[[i, k]];
            }
        }

        for j in index..(r - 1) {
            let a = self.factor[[j, j]];
            let b = self.factor[[j, j + 1]];
            let rho = a.hypot(b);
            if rho == F::zero() {
                continue;
            }
            let cos = a / rho;
            let sin = b / rho;
            self.factor[[j, j]] = rho;
            self.factor[[j, j + 1]] = F::zero();
            for i in (j + 1)..(r - 1) {
                let x = self.factor[[i, j]];
                let y = self.factor[[i, j + 1]];
                self.factor[[i, j]] = cos * x + sin * y;
                self.factor[[i, j + 1]] = cos * y - sin * x;
            }
        }

        for k in 0..r {
            self.factor[[r - 1, k]] = F::zero();
        }
        self.rank -= 1;
    }

    /// Solve `(L·Lᵀ) x = b` in place against the current factorization.
    ///
    /// `rhs` must have exactly [`rank`](Self::rank) entries.
    pub fn solve_in_place(&self, rhs: &mut [F]) {
        let r = self.rank;
        debug_assert_eq!(rhs.len(), r);

        for i in 0..r {
            let mut sum = rhs[i];
            for k in 0..i {
                sum = sum - self.factor[[i, k]] * rhs[k];
            }
            rhs[i] = sum / self.factor[[i, i]];
        }
        for i in (0..r).rev() {
            let mut sum = rhs[i];
            for k in (i + 1)..r {
                sum = sum - self.factor[[k, i]] * rhs[k];
            }
            rhs[i] = sum / self.factor[[i, i]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GramCholesky;
    use crate::error::LarsError;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn append_gram(chol: &mut GramCholesky<f64>, gram: &Array2<f64>, column: usize, basis: &[usize]) {
        let mut products: Vec<f64> = basis.iter().map(|&k| gram[[column, k]]).collect();
        products.push(gram[[column, column]]);
        chol.append(&products).unwrap();
    }

    fn reconstruct(chol: &GramCholesky<f64>) -> Array2<f64> {
        let r = chol.rank();
        let mut out = Array2::zeros((r, r));
        for i in 0..r {
            for j in 0..r {
                for k in 0..r {
                    out[[i, j]] += chol.factor[[i, k]] * chol.factor[[j, k]];
                }
            }
        }
        out
    }

    #[test]
    fn append_factors_the_gram_matrix() {
        let gram = array![[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]];
        let mut chol = GramCholesky::new(3);
        append_gram(&mut chol, &gram, 0, &[]);
        append_gram(&mut chol, &gram, 1, &[0]);
        append_gram(&mut chol, &gram, 2, &[0, 1]);

        assert_eq!(chol.rank(), 3);
        assert_abs_diff_eq!(reconstruct(&chol), gram, epsilon = 1e-12);
    }

    #[test]
    fn solve_matches_direct_solution() {
        let gram = array![[4.0, 2.0], [2.0, 3.0]];
        let mut chol = GramCholesky::new(2);
        append_gram(&mut chol, &gram, 0, &[]);
        append_gram(&mut chol, &gram, 1, &[0]);

        // 4x + 2y = 10, 2x + 3y = 11 has the solution (1, 3)
        let mut rhs = [10.0, 11.0];
        chol.solve_in_place(&mut rhs);
        assert_abs_diff_eq!(rhs[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rhs[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn remove_rebuilds_the_reduced_factorization() {
        let gram = array![
            [4.0, 2.0, 0.6, 1.0],
            [2.0, 5.0, 1.0, 0.4],
            [0.6, 1.0, 3.0, 0.8],
            [1.0, 0.4, 0.8, 2.0]
        ];
        let mut chol = GramCholesky::new(4);
        for (i, basis) in [&[][..], &[0][..], &[0, 1][..], &[0, 1, 2][..]]
            .iter()
            .enumerate()
        {
            append_gram(&mut chol, &gram, i, basis);
        }

        chol.remove(1);
        assert_eq!(chol.rank(), 3);

        // same gram with row/column 1 deleted
        let reduced = array![[4.0, 0.6, 1.0], [0.6, 3.0, 0.8], [1.0, 0.8, 2.0]];
        assert_abs_diff_eq!(reconstruct(&chol), reduced, epsilon = 1e-12);

        let mut fresh = GramCholesky::new(3);
        append_gram(&mut fresh, &reduced, 0, &[]);
        append_gram(&mut fresh, &reduced, 1, &[0]);
        append_gram(&mut fresh, &reduced, 2, &[0, 1]);

        // the factor with positive diagonal is unique, so the downdated and
        // the freshly built one must agree entry-wise
        for i in 0..3 {
            for j in 0..=i {
                assert_abs_diff_eq!(chol.factor[[i, j]], fresh.factor[[i, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn dependent_column_is_rejected() {
        // second column identical to the first
        let gram = array![[2.0, 2.0], [2.0, 2.0]];
        let mut chol = GramCholesky::new(2);
        append_gram(&mut chol, &gram, 0, &[]);

        let err = chol.append(&[2.0, 2.0]).unwrap_err();
        assert!(matches!(err, LarsError::IllConditioned));
        assert_eq!(chol.rank(), 1);

        // the factorization stays usable after the rejection
        let mut rhs = [4.0];
        chol.solve_in_place(&mut rhs);
        assert_abs_diff_eq!(rhs[0], 2.0, epsilon = 1e-12);
    }
}
