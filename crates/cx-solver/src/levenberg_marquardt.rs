//! One-shot fallback root finder: the `levenberg-marquardt` crate (MINPACK `lmder`)
//! fed with a forward-difference Jacobian.

use crate::jacobian::finite_difference_jacobian;
use crate::root::{RootMethod, RootResult, all_finite};
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{DMatrix, DVector, Dyn, Owned};
use std::cell::Cell;

/// Levenberg–Marquardt configuration.
#[derive(Debug, Clone, Copy)]
pub struct LevenbergMarquardtConfig {
    /// Relative reduction of the sum of squares considered converged
    pub ftol: f64,
    /// Relative step size considered converged
    pub xtol: f64,
    /// Orthogonality between residual and Jacobian columns considered converged
    pub gtol: f64,
    /// Residual call budget is `patience * (n + 1)`, Jacobian columns excluded
    pub patience: usize,
    /// Forward-difference step for the Jacobian
    pub epsfcn: f64,
}

impl Default for LevenbergMarquardtConfig {
    fn default() -> Self {
        Self {
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            gtol: 0.0,
            patience: 100,
            epsfcn: f64::EPSILON.sqrt(),
        }
    }
}

struct LeastSquares<F> {
    residual_fn: F,
    epsfcn: f64,
    x: DVector<f64>,
    fx: DVector<f64>,
    evaluations: Cell<usize>,
}

impl<F> LeastSquares<F>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    fn call(&self, x: &DVector<f64>) -> DVector<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        (self.residual_fn)(x)
    }
}

impl<F> LeastSquaresProblem<f64, Dyn, Dyn> for LeastSquares<F>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.fx = self.call(x);
        self.x = x.clone();
    }

    fn params(&self) -> DVector<f64> {
        self.x.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        all_finite(&self.fx).then(|| self.fx.clone())
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let jac = finite_difference_jacobian(&self.x, &self.fx, |x| self.call(x), self.epsfcn);
        jac.iter().all(|v| v.is_finite()).then_some(jac)
    }
}

/// Minimize `|residual_fn(x)|²` from `x0`; a zero residual is a root.
///
/// Never fails: termination without convergence is reported through
/// `RootResult::converged` and `RootResult::message`.
pub fn levenberg_marquardt_solve<F>(
    x0: DVector<f64>,
    residual_fn: F,
    config: &LevenbergMarquardtConfig,
) -> RootResult
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let mut problem = LeastSquares {
        residual_fn,
        epsfcn: config.epsfcn,
        x: x0.clone(),
        fx: DVector::zeros(0),
        evaluations: Cell::new(0),
    };
    problem.set_params(&x0);

    let (problem, report) = LevenbergMarquardt::new()
        .with_ftol(config.ftol)
        .with_xtol(config.xtol)
        .with_gtol(config.gtol)
        .with_patience(config.patience)
        .minimize(problem);

    let residual_norm = problem.fx.norm();
    RootResult {
        converged: report.termination.was_successful() && residual_norm.is_finite(),
        message: format!("{:?}", report.termination),
        iterations: report.number_of_evaluations,
        evaluations: problem.evaluations.get(),
        residual_norm,
        x: problem.x,
        fun: problem.fx,
        method: RootMethod::LevenbergMarquardt,
    }
}
