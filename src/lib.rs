//! # Least angle regression
//!
//! This crate computes the full least angle regression (LARS) solution path
//! and its lasso variant. Instead of fitting a single coefficient vector for
//! one regularization strength, the solver walks the whole path: starting
//! from the empty model it adds (and, for the lasso, removes) one feature per
//! breakpoint, keeping the coefficients of all active features equally
//! correlated with the residual.
//!
//! LARS is similar to forward stepwise regression. At each step it finds the
//! feature most correlated with the residual. When several features are tied,
//! it proceeds in a direction equiangular between them rather than committing
//! to any single one.
//!
//! ## Example
//!
//! ```
//! use linfa::traits::Fit;
//! use linfa::Dataset;
//! use lars_path::Lars;
//! use ndarray::array;
//!
//! let dataset = Dataset::new(array![[1.0, 0.0], [0.0, 1.0]], array![3.0, 2.0]);
//!
//! let model = Lars::params().fit_intercept(false).fit(&dataset).unwrap();
//!
//! println!("coefficients: {}", model.hyperplane());
//! ```
//!
//! ## Implementation
//!
//! The path is produced by a step-wise engine ([`PathSolver`]) which can also
//! be driven directly, one breakpoint at a time. It tracks residual and
//! direction correlations for every feature and maintains a Cholesky
//! factorization of the active-feature Gram matrix under insertion and
//! removal of single columns, so every step costs one triangular solve
//! instead of a fresh factorization. Column access to the data goes through
//! the [`Design`] trait with dense ([`DenseDesign`]) and sparse
//! ([`SparseDesign`]) backends.
//!
//! ## References
//!
//! * ["Least Angle Regression", Efron et al.](https://web.stanford.edu/~hastie/Papers/LARS/LeastAngle_2002.pdf)
//! * [Wikipedia entry on the Least-angle regression](https://en.wikipedia.org/wiki/Least-angle_regression)
//! * [Wikipedia entry on the Lasso](https://en.wikipedia.org/wiki/Lasso_(statistics))

use linfa::{traits::PredictInplace, Float};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

pub use cholesky::GramCholesky;
pub use design::{DenseDesign, Design, SparseDesign};
pub use error::{LarsError, Result};
pub use hyperparams::{LarsParams, LarsValidParams};
pub use solver::{LarsMode, PathSolver};

mod algorithm;
mod cholesky;
mod design;
mod error;
mod hyperparams;
mod solver;

/// A fitted least angle regression model.
///
/// Holds the endpoint of the solution path (the separating hyperplane and
/// optional intercept) together with the path itself: one coefficient column
/// and one regularization value per breakpoint.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone)]
pub struct Lars<F> {
    hyperplane: Array1<F>,
    intercept: F,
    alphas: Array1<F>,
    n_iter: usize,
    active: Vec<usize>,
    coef_path: Array2<F>,
}

impl<F: Float> Lars<F> {
    /// Create default LAR hyper parameters: features only ever enter the
    /// model.
    ///
    /// By default, an intercept will be fitted. To disable fitting an
    /// intercept, call `.fit_intercept(false)` before calling `.fit()`.
    pub fn params() -> LarsParams<F> {
        LarsParams::new()
    }

    /// Create hyper parameters for the lasso variant, where a coefficient
    /// reaching zero leaves the model again.
    pub fn lasso() -> LarsParams<F> {
        LarsParams::new().mode(LarsMode::Lasso)
    }

    /// Create hyper parameters for the positive lasso variant.
    ///
    /// See [`LarsMode::PositiveLasso`] for the current behavior of this mode.
    pub fn positive_lasso() -> LarsParams<F> {
        LarsParams::new().mode(LarsMode::PositiveLasso)
    }

    /// Get the fitted hyperplane, i.e. the coefficients at the end of the
    /// path.
    pub fn hyperplane(&self) -> &Array1<F> {
        &self.hyperplane
    }

    /// Get the fitted intercept, 0 if no intercept was fitted.
    pub fn intercept(&self) -> F {
        self.intercept
    }

    /// Maximum of the residual correlations (in absolute value, scaled by
    /// the number of samples) at each breakpoint.
    pub fn alphas(&self) -> &Array1<F> {
        &self.alphas
    }

    /// The number of breakpoints the path went through.
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Indices of the active features at the end of the path, in the order
    /// they entered the model.
    pub fn active(&self) -> &[usize] {
        &self.active
    }

    /// The varying values of the coefficients along the path, one column per
    /// breakpoint. The first column is the all-zero start of the path.
    pub fn coef_path(&self) -> &Array2<F> {
        &self.coef_path
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for Lars<F> {
    /// Given an input matrix `X`, with shape `(n_samples, n_features)`,
    /// `predict` returns the target variable according to the fitted path
    /// endpoint.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );

        *y = x.dot(&self.hyperplane) + self.intercept;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}
