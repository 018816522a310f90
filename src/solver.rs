//! The step-wise least angle engine.
//!
//! [`PathSolver`] advances the solution path one breakpoint per call: every
//! successful [`step`](PathSolver::step) either lets one or more features
//! enter the model or, in lasso mode, lets a coefficient that reached zero
//! leave it. The solver keeps three coupled pieces of state in lockstep: the
//! active coefficients with their position map, the residual and direction
//! correlation vectors, and the Cholesky factorization of the active Gram
//! matrix.

use linfa::Float;
use ndarray::Array1;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::cholesky::GramCholesky;
use crate::design::Design;

/// Variants of the least angle path.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LarsMode {
    /// Plain least angle regression: features only ever enter the model.
    Lar,
    /// Lasso modification: a coefficient crossing zero is removed from the
    /// model at the exact step where it would change sign.
    Lasso,
    /// Positive lasso.
    ///
    /// This mode currently advances exactly like [`LarsMode::Lar`]: the step
    /// length uses the plain boundary search and the zero-crossing removal
    /// only fires for [`LarsMode::Lasso`], so no sign constraint is enforced
    /// on the coefficients.
    PositiveLasso,
}

/// One-breakpoint-at-a-time least angle solver over a [`Design`].
///
/// Construction performs the full initialization pass; afterwards all
/// mutation happens through [`step`](PathSolver::step). The solver is never
/// reset: once the path is exhausted, further calls return `false`.
pub struct PathSolver<F, D> {
    design: D,
    mode: LarsMode,
    eps: F,
    /// (feature, coefficient) pairs in the order the features entered.
    beta: Vec<(usize, F)>,
    /// Feature index to position in `beta`, `None` while inactive.
    active: Vec<Option<usize>>,
    /// Correlation of every feature column with the current residual.
    c: Array1<F>,
    /// Correlation of every feature column with the current step direction.
    a: Array1<F>,
    /// Step direction over the active features, aligned with `beta`.
    w: Vec<F>,
    gram: GramCholesky<F>,
    recently_deactivated: bool,
}

impl<F: Float, D: Design<F>> PathSolver<F, D> {
    /// Set up the solver: size all state to the problem dimensions and pull
    /// the initial response correlations from the design.
    ///
    /// `eps` is the tolerance deciding which features count as tied for the
    /// maximum correlation; machine epsilon of `F` is the natural choice.
    pub fn new(design: D, mode: LarsMode, eps: F) -> Self {
        let nfeatures = design.nfeatures();
        let max_rank = design.nsamples().min(nfeatures);

        let mut c = Array1::zeros(nfeatures);
        design.response_correlations(&mut c);

        PathSolver {
            design,
            mode,
            eps,
            beta: Vec::with_capacity(max_rank),
            active: vec![None; nfeatures],
            c,
            a: Array1::zeros(nfeatures),
            w: Vec::with_capacity(max_rank),
            gram: GramCholesky::new(max_rank),
            recently_deactivated: false,
        }
    }

    /// Whether feature `feature` currently carries a coefficient.
    pub fn is_active(&self, feature: usize) -> bool {
        self.active[feature].is_some()
    }

    /// The current coefficients as (feature, value) pairs, in the order the
    /// features entered the model.
    pub fn coefficients(&self) -> &[(usize, F)] {
        &self.beta
    }

    /// Correlation of every feature column with the current residual.
    pub fn residual_correlations(&self) -> &Array1<F> {
        &self.c
    }

    /// The largest residual correlation in absolute value.
    pub fn max_correlation(&self) -> F {
        self.c
            .iter()
            .fold(F::zero(), |max, &value| max.max(value.abs()))
    }

    /// Advance the path by one breakpoint.
    ///
    /// Returns `false` once the path is exhausted: either every feature is in
    /// the model, or no further feature qualifies (no correlation ties left
    /// to add, or the available rank is used up). Once exhausted, every
    /// subsequent call keeps returning `false`.
    pub fn step(&mut self) -> bool {
        if self.beta.len() >= self.design.nfeatures() {
            return false;
        }
        if !self.update_active_set() {
            return false;
        }
        if self.beta.is_empty() {
            return false;
        }

        self.find_search_direction();
        self.take_step();
        true
    }

    /// Put `feature` into the active set.
    ///
    /// Fails without mutating anything when the feature is already active,
    /// when the active set has as many members as there are observations, or
    /// when the feature's column is linearly dependent on the active ones.
    fn activate(&mut self, feature: usize) -> bool {
        if self.is_active(feature) || self.beta.len() >= self.design.nsamples() {
            return false;
        }

        self.beta.push((feature, F::zero()));
        self.w.push(F::zero());

        let products: Vec<F> = self
            .beta
            .iter()
            .map(|&(other, _)| self.design.column_product(feature, other))
            .collect();
        if self.gram.append(&products).is_err() {
            self.beta.pop();
            self.w.pop();
            return false;
        }

        self.active[feature] = Some(self.beta.len() - 1);
        true
    }

    /// Take `feature` out of the active set and rebuild the position map.
    ///
    /// The full rebuild is linear in the active-set size, which is bounded by
    /// the problem rank.
    fn deactivate(&mut self, feature: usize) -> bool {
        let position = match self.active[feature] {
            Some(position) => position,
            None => return false,
        };

        self.beta.remove(position);
        self.w.remove(position);
        self.gram.remove(position);

        for slot in self.active.iter_mut() {
            *slot = None;
        }
        for (position, &(other, _)) in self.beta.iter().enumerate() {
            self.active[other] = Some(position);
        }

        self.recently_deactivated = true;
        true
    }

    /// Bring every feature tied for the maximum absolute residual correlation
    /// into the active set.
    ///
    /// Ties must enter together: advancing with only part of a tie would
    /// break the equal-correlation invariant on the very next step. An active
    /// set that just shrank counts as changed and must not be regrown in the
    /// same pass, otherwise the feature removed at zero would re-enter
    /// immediately. Returns whether the active set changed; a failed
    /// activation aborts with `false`, which signals termination.
    fn update_active_set(&mut self) -> bool {
        if self.recently_deactivated {
            self.recently_deactivated = false;
            return true;
        }

        let mut max = F::zero();
        for feature in 0..self.design.nfeatures() {
            if !self.is_active(feature) {
                max = max.max(self.c[feature].abs());
            }
        }

        let mut changed = false;
        for feature in 0..self.design.nfeatures() {
            if self.is_active(feature) {
                continue;
            }
            if (self.c[feature].abs() - max).abs() < self.eps {
                if !self.activate(feature) {
                    return false;
                }
                changed = true;
            }
        }
        changed
    }

    /// Solve the active normal equations for the equiangular direction and
    /// recompute the direction correlations of every feature against it.
    fn find_search_direction(&mut self) {
        for (position, &(feature, _)) in self.beta.iter().enumerate() {
            self.w[position] = self.c[feature];
        }
        self.gram.solve_in_place(&mut self.w);

        self.design
            .direction_correlations(&self.beta, &self.w, &mut self.a);
    }

    /// Compute the step length, apply the update, and perform a pending
    /// lasso removal.
    ///
    /// The step length defaults to a full step of 1 and is shortened to the
    /// nearest boundary event: an inactive feature catching up with the
    /// active correlation, or (lasso only) an active coefficient reaching
    /// zero. The first active feature serves as the correlation reference,
    /// which is valid because all active features share the same absolute
    /// correlation.
    fn take_step(&mut self) {
        let mut lambda = F::one();

        let (first, _) = self.beta[0];
        let reference_a = self.a[first];
        let reference_c = self.c[first];

        for feature in 0..self.design.nfeatures() {
            if self.is_active(feature) {
                continue;
            }
            let join_above = (reference_c - self.c[feature]) / (reference_a - self.a[feature]);
            let join_below = (reference_c + self.c[feature]) / (reference_a + self.a[feature]);
            for candidate in [join_above, join_below] {
                if candidate > F::zero() && candidate.is_finite() {
                    lambda = lambda.min(candidate);
                }
            }
        }

        let mut pending_removal = None;
        if self.mode == LarsMode::Lasso {
            let mut crossing = F::infinity();
            for (position, &(_, value)) in self.beta.iter().enumerate() {
                let candidate = -value / self.w[position];
                if candidate > F::zero() && candidate < crossing {
                    crossing = candidate;
                    pending_removal = Some(position);
                }
            }
            if crossing < lambda {
                lambda = crossing;
            } else {
                pending_removal = None;
            }
        }

        for (position, entry) in self.beta.iter_mut().enumerate() {
            entry.1 += lambda * self.w[position];
        }
        self.c.scaled_add(-lambda, &self.a);

        if let Some(position) = pending_removal {
            let (feature, _) = self.beta[position];
            self.deactivate(feature);
        }
    }

    /// Unconstrained least squares solution restricted to `basis`, reusing
    /// the currently maintained factorization.
    ///
    /// `basis` must list exactly the features the factorization was built
    /// for, in the order they entered the model; passing anything else yields
    /// meaningless values. This is the caller's responsibility and is not
    /// checked beyond the length.
    pub fn least_squares(&self, basis: &[usize]) -> Vec<(usize, F)> {
        debug_assert_eq!(basis.len(), self.gram.rank());

        let mut correlations = Array1::zeros(self.design.nfeatures());
        self.design.response_correlations(&mut correlations);

        let mut solution: Vec<F> = basis.iter().map(|&feature| correlations[feature]).collect();
        self.gram.solve_in_place(&mut solution);

        basis.iter().copied().zip(solution).collect()
    }
}
