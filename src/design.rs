//! Column access to the design matrix.
//!
//! The path solver never touches the data directly: everything it needs is a
//! handful of dot-product queries, so those are gathered behind the
//! [`Design`] trait and each storage backend answers them in whatever way
//! suits its layout. [`DenseDesign`] serves ndarray views, [`SparseDesign`]
//! serves a compressed-column matrix and skips the zeros in every query.

use std::cmp::Ordering;

use linfa::Float;
use ndarray::{Array1, ArrayView1, ArrayView2};
use sprs::{CsMatView, CsVecView};

/// Dot-product queries of a design matrix and its response.
///
/// Implementors hold both the records and the response, since the solver
/// initializes itself from the per-feature response correlations.
pub trait Design<F: Float> {
    /// Number of observations (rows).
    fn nsamples(&self) -> usize;

    /// Number of features (columns).
    fn nfeatures(&self) -> usize;

    /// Fill `out` with the dot product of every feature column against the
    /// response.
    fn response_correlations(&self, out: &mut Array1<F>);

    /// Dot product of feature columns `i` and `j`.
    fn column_product(&self, i: usize, j: usize) -> F;

    /// Fill `out` with the dot product of every feature column against the
    /// direction `X_active · direction`.
    ///
    /// `active` holds the (feature, coefficient) pairs currently in the
    /// model and `direction` one weight per pair, in the same order; only
    /// the feature indices of `active` are read here.
    fn direction_correlations(&self, active: &[(usize, F)], direction: &[F], out: &mut Array1<F>);
}

/// Design matrix access backed by dense ndarray views.
pub struct DenseDesign<'a, F> {
    records: ArrayView2<'a, F>,
    targets: ArrayView1<'a, F>,
}

impl<'a, F: Float> DenseDesign<'a, F> {
    pub fn new(records: ArrayView2<'a, F>, targets: ArrayView1<'a, F>) -> Self {
        assert_eq!(
            records.nrows(),
            targets.len(),
            "The number of records must match the number of targets."
        );
        DenseDesign { records, targets }
    }
}

impl<'a, F: Float> Design<F> for DenseDesign<'a, F> {
    fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    fn nfeatures(&self) -> usize {
        self.records.ncols()
    }

    fn response_correlations(&self, out: &mut Array1<F>) {
        out.assign(&self.records.t().dot(&self.targets));
    }

    fn column_product(&self, i: usize, j: usize) -> F {
        self.records.column(i).dot(&self.records.column(j))
    }

    fn direction_correlations(&self, active: &[(usize, F)], direction: &[F], out: &mut Array1<F>) {
        debug_assert_eq!(active.len(), direction.len());

        let mut fitted = Array1::zeros(self.nsamples());
        for (&(feature, _), &weight) in active.iter().zip(direction) {
            fitted.scaled_add(weight, &self.records.column(feature));
        }
        out.assign(&self.records.t().dot(&fitted));
    }
}

/// Design matrix access backed by a compressed sparse column matrix.
///
/// The response stays dense; regression targets rarely profit from sparse
/// storage.
pub struct SparseDesign<'a, F> {
    records: CsMatView<'a, F>,
    targets: ArrayView1<'a, F>,
}

impl<'a, F: Float> SparseDesign<'a, F> {
    pub fn new(records: CsMatView<'a, F>, targets: ArrayView1<'a, F>) -> Self {
        assert!(
            records.is_csc(),
            "The sparse design matrix must use column-major (CSC) storage."
        );
        assert_eq!(
            records.rows(),
            targets.len(),
            "The number of records must match the number of targets."
        );
        SparseDesign { records, targets }
    }

    fn column(&self, j: usize) -> CsVecView<'_, F> {
        self.records.outer_view(j).unwrap()
    }
}

impl<'a, F: Float> Design<F> for SparseDesign<'a, F> {
    fn nsamples(&self) -> usize {
        self.records.rows()
    }

    fn nfeatures(&self) -> usize {
        self.records.cols()
    }

    fn response_correlations(&self, out: &mut Array1<F>) {
        for j in 0..self.nfeatures() {
            let mut sum = F::zero();
            for (row, &value) in self.column(j).iter() {
                sum += value * self.targets[row];
            }
            out[j] = sum;
        }
    }

    fn column_product(&self, i: usize, j: usize) -> F {
        let left = self.column(i);
        let right = self.column(j);
        let mut left_iter = left.iter();
        let mut right_iter = right.iter();
        let mut a = left_iter.next();
        let mut b = right_iter.next();

        let mut sum = F::zero();
        while let (Some((row_a, value_a)), Some((row_b, value_b))) = (a, b) {
            match row_a.cmp(&row_b) {
                Ordering::Less => a = left_iter.next(),
                Ordering::Greater => b = right_iter.next(),
                Ordering::Equal => {
                    sum += *value_a * *value_b;
                    a = left_iter.next();
                    b = right_iter.next();
                }
            }
        }
        sum
    }

    fn direction_correlations(&self, active: &[(usize, F)], direction: &[F], out: &mut Array1<F>) {
        debug_assert_eq!(active.len(), direction.len());

        let mut fitted = Array1::<F>::zeros(self.nsamples());
        for (&(feature, _), &weight) in active.iter().zip(direction) {
            for (row, &value) in self.column(feature).iter() {
                fitted[row] += weight * value;
            }
        }
        for j in 0..self.nfeatures() {
            let mut sum = F::zero();
            for (row, &value) in self.column(j).iter() {
                sum += value * fitted[row];
            }
            out[j] = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DenseDesign, Design, SparseDesign};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2, ArrayView2};
    use sprs::{CsMat, TriMat};

    fn to_csc(dense: ArrayView2<f64>) -> CsMat<f64> {
        let mut tri = TriMat::new((dense.nrows(), dense.ncols()));
        for ((row, col), &value) in dense.indexed_iter() {
            if value != 0.0 {
                tri.add_triplet(row, col, value);
            }
        }
        tri.to_csc()
    }

    fn fixture() -> (Array2<f64>, Array1<f64>) {
        let records = array![
            [1.0, 0.0, 2.0, 0.0],
            [0.0, 3.0, 0.0, 0.0],
            [4.0, 0.0, 0.5, 1.0],
            [0.0, 1.0, 0.0, 2.0],
            [2.0, 0.0, 0.0, 0.0]
        ];
        let targets = array![1.0, -2.0, 0.5, 3.0, -1.0];
        (records, targets)
    }

    #[test]
    fn sparse_agrees_with_dense() {
        let (records, targets) = fixture();
        let sparse_records = to_csc(records.view());

        let dense = DenseDesign::new(records.view(), targets.view());
        let sparse = SparseDesign::new(sparse_records.view(), targets.view());

        assert_eq!(dense.nsamples(), sparse.nsamples());
        assert_eq!(dense.nfeatures(), sparse.nfeatures());

        let mut from_dense = Array1::zeros(4);
        let mut from_sparse = Array1::zeros(4);
        dense.response_correlations(&mut from_dense);
        sparse.response_correlations(&mut from_sparse);
        assert_abs_diff_eq!(from_dense, from_sparse, epsilon = 1e-12);

        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(
                    dense.column_product(i, j),
                    sparse.column_product(i, j),
                    epsilon = 1e-12
                );
            }
        }

        let active = [(2usize, 0.0), (0usize, 0.0)];
        let direction = [0.7, -1.2];
        dense.direction_correlations(&active, &direction, &mut from_dense);
        sparse.direction_correlations(&active, &direction, &mut from_sparse);
        assert_abs_diff_eq!(from_dense, from_sparse, epsilon = 1e-12);
    }

    #[test]
    fn response_correlations_are_column_dots() {
        let (records, targets) = fixture();
        let dense = DenseDesign::new(records.view(), targets.view());

        let mut out = Array1::zeros(4);
        dense.response_correlations(&mut out);
        for j in 0..4 {
            assert_abs_diff_eq!(out[j], records.column(j).dot(&targets), epsilon = 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn csr_storage_is_rejected() {
        let (records, targets) = fixture();
        let csr = to_csc(records.view()).to_csr();
        SparseDesign::new(csr.view(), targets.view());
    }
}
