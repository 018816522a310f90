use linfa::{dataset::AsSingleTargets, prelude::Records, traits::Fit, DatasetBase, Float};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

use crate::design::DenseDesign;
use crate::error::LarsError;
use crate::hyperparams::LarsValidParams;
use crate::solver::PathSolver;
use crate::Lars;

impl<F, D, T> Fit<ArrayBase<D, Ix2>, T, LarsError> for LarsValidParams<F>
where
    F: Float,
    D: Data<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    type Object = Lars<F>;

    /// Fit the full least angle path given a feature matrix `x` and a target
    /// variable `y`.
    ///
    /// The feature matrix `x` must have shape `(n_samples, n_features)`
    /// The target variable `y` must have shape `(n_samples)`
    ///
    /// Returns a [`Lars`] object holding the path and its endpoint, which can
    /// be used to `predict` values of the target variable for new feature
    /// values.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Lars<F>, LarsError> {
        let records = dataset.records();
        let nfeatures = records.nfeatures();
        let scale = F::cast(records.nsamples());

        let (intercept, y) = self.compute_intercept(dataset.as_single_targets());

        let design = DenseDesign::new(records.view(), y.view());
        let mut solver = PathSolver::new(design, self.mode(), self.eps());

        // the path starts with the empty model; every breakpoint adds one
        // coefficient column and one regularization value
        let mut snapshots = vec![Array1::zeros(nfeatures)];
        let mut alphas = vec![solver.max_correlation() / scale];

        let mut n_iter = 0;
        while n_iter < self.max_steps() && solver.step() {
            n_iter += 1;

            let mut snapshot = Array1::zeros(nfeatures);
            for &(feature, value) in solver.coefficients() {
                snapshot[feature] = value;
            }
            snapshots.push(snapshot);
            alphas.push(solver.max_correlation() / scale);
        }

        let hyperplane = snapshots[snapshots.len() - 1].clone();
        let active = solver.coefficients().iter().map(|&(f, _)| f).collect();

        let mut coef_path = Array2::zeros((nfeatures, snapshots.len()));
        for (breakpoint, snapshot) in snapshots.iter().enumerate() {
            coef_path.column_mut(breakpoint).assign(snapshot);
        }

        Ok(Lars {
            hyperplane,
            intercept,
            alphas: Array1::from(alphas),
            n_iter,
            active,
            coef_path,
        })
    }
}
