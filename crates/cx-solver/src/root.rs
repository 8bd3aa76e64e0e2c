//! Shared result type of the multivariate root finders.

use nalgebra::DVector;
use std::fmt;

/// Root-finding method that produced a [`RootResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMethod {
    /// Dogleg trust region, the primary method.
    Hybrid,
    /// Levenberg–Marquardt damped least squares.
    LevenbergMarquardt,
}

impl fmt::Display for RootMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootMethod::Hybrid => write!(f, "hybr"),
            RootMethod::LevenbergMarquardt => write!(f, "lm"),
        }
    }
}

/// Outcome of a root-finding run. Always carries the last iterate, converged or not.
#[derive(Debug, Clone)]
pub struct RootResult {
    /// Last accepted iterate
    pub x: DVector<f64>,
    /// Residual at `x`
    pub fun: DVector<f64>,
    /// Euclidean norm of `fun`
    pub residual_norm: f64,
    /// Accepted steps
    pub iterations: usize,
    /// Residual function calls, Jacobian columns included
    pub evaluations: usize,
    /// Converged flag
    pub converged: bool,
    /// Termination reason
    pub message: String,
    pub method: RootMethod,
}

pub(crate) fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}
