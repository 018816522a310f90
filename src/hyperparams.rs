use linfa::{Float, ParamGuard};
use ndarray::{ArrayView1, CowArray, Ix1};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::LarsError;
use crate::solver::LarsMode;

/// A verified hyper-parameter set ready for fitting a least angle regression
/// model.
///
/// See [`LarsParams`](crate::LarsParams) for more information.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LarsValidParams<F> {
    mode: LarsMode,
    fit_intercept: bool,
    eps: F,
    max_steps: usize,
}

impl<F: Float> LarsValidParams<F> {
    pub fn mode(&self) -> LarsMode {
        self.mode
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn eps(&self) -> F {
        self.eps
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Compute the intercept as the mean of `y` and center `y` if an
    /// intercept should be used, use 0 as intercept and leave `y` unchanged
    /// otherwise.
    pub fn compute_intercept<'a>(&self, y: ArrayView1<'a, F>) -> (F, CowArray<'a, F, Ix1>) {
        if self.fit_intercept {
            let y_mean = y.mean().unwrap();
            let y_centered = &y - y_mean;
            (y_mean, y_centered.into())
        } else {
            (F::zero(), y.into())
        }
    }
}

/// Hyper parameters for a least angle regression path.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LarsParams<F>(LarsValidParams<F>);

impl<F: Float> Default for LarsParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> LarsParams<F> {
    /// Create default hyper parameters for a plain LAR path.
    ///
    /// By default, an intercept will be fitted. To disable fitting an
    /// intercept, call `.fit_intercept(false)` before calling `.fit()`.
    pub fn new() -> Self {
        Self(LarsValidParams {
            mode: LarsMode::Lar,
            fit_intercept: true,
            eps: F::epsilon(),
            max_steps: 500,
        })
    }

    /// Select the path variant, see [`LarsMode`].
    /// Defaults to [`LarsMode::Lar`] if not set.
    pub fn mode(mut self, mode: LarsMode) -> Self {
        self.0.mode = mode;
        self
    }

    /// Whether to calculate the intercept for this model.
    /// Defaults to `true` if not set.
    /// If set to false, no intercept will be used in calculations.
    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.0.fit_intercept = fit_intercept;
        self
    }

    /// Set the tolerance under which two absolute correlations count as
    /// tied. Features tied for the maximum enter the active set together.
    ///
    /// Defaults to the machine precision of `F` if not set.
    pub fn eps(mut self, eps: F) -> Self {
        self.0.eps = eps;
        self
    }

    /// Set the maximum number of breakpoints the path may go through before
    /// fitting stops early.
    ///
    /// Defaults to `500` if not set.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.0.max_steps = max_steps;
        self
    }
}

impl<F: Float> ParamGuard for LarsParams<F> {
    type Checked = LarsValidParams<F>;
    type Error = LarsError;

    /// Validate the hyper parameters
    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.eps.is_negative() {
            Err(LarsError::InvalidEpsilon)
        } else if self.0.max_steps == 0 {
            Err(LarsError::InvalidMaxSteps)
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
