//! Primary root finder: `gomez`'s dogleg trust-region solver.
//!
//! `gomez` differentiates by forward differences with a step of about
//! `sqrt(ε) * max(|x|, 1)`. The unknowns are handed to it divided by
//! [`HybridConfig::variable_scale`], which sets the absolute step for unknowns of
//! order one or smaller.

use crate::root::{RootMethod, RootResult, all_finite};
use gomez::nalgebra as gna;
use gomez::{Domain, Problem, SolverDriver, System};
use gna::{Dyn, IsContiguous};
use nalgebra::DVector;
use std::cell::Cell;
use tracing::trace;

/// Trust-region solver configuration.
#[derive(Debug, Clone, Copy)]
pub struct HybridConfig {
    /// Converged once the residual norm is at most this
    pub tolerance: f64,
    /// Residual call budget (defaults to 200 * (n + 1))
    pub max_evaluations: Option<usize>,
    /// Unknowns are solved for in units of this value
    pub variable_scale: f64,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_evaluations: None,
            variable_scale: 1.0,
        }
    }
}

struct ScaledSystem<F> {
    residual_fn: F,
    dim: usize,
    scale: f64,
    evaluations: Cell<usize>,
}

impl<F> ScaledSystem<F>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    fn unscale(&self, y: &[f64]) -> DVector<f64> {
        DVector::from_iterator(y.len(), y.iter().map(|v| v * self.scale))
    }

    fn call(&self, x: &DVector<f64>) -> DVector<f64> {
        self.evaluations.set(self.evaluations.get() + 1);
        (self.residual_fn)(x)
    }
}

impl<F> Problem for ScaledSystem<F> {
    type Field = f64;

    fn domain(&self) -> Domain<Self::Field> {
        Domain::unconstrained(self.dim)
    }
}

impl<F> System for ScaledSystem<F>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    fn eval<Sx, Srx>(
        &self,
        x: &gna::Vector<Self::Field, Dyn, Sx>,
        rx: &mut gna::Vector<Self::Field, Dyn, Srx>,
    ) where
        Sx: gna::storage::Storage<Self::Field, Dyn> + IsContiguous,
        Srx: gna::storage::StorageMut<Self::Field, Dyn>,
    {
        let y: Vec<f64> = x.iter().copied().collect();
        let r = self.call(&self.unscale(&y));
        for (dst, value) in rx.iter_mut().zip(r.iter()) {
            *dst = *value;
        }
    }
}

/// Solve `residual_fn(x) = 0` for square systems, starting at `x0`.
///
/// Never fails: termination without convergence is reported through
/// `RootResult::converged` and `RootResult::message`.
pub fn hybrid_solve<F>(x0: DVector<f64>, residual_fn: F, config: &HybridConfig) -> RootResult
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n = x0.len();
    let max_evaluations = config.max_evaluations.unwrap_or(200 * (n + 1));
    let system = ScaledSystem {
        residual_fn,
        dim: n,
        scale: config.variable_scale,
        evaluations: Cell::new(0),
    };

    let finish = |x: DVector<f64>, iterations: usize, converged: bool, message: String| {
        let fun = system.call(&x);
        let residual_norm = fun.norm();
        RootResult {
            x,
            fun,
            residual_norm,
            iterations,
            evaluations: system.evaluations.get(),
            converged,
            message,
            method: RootMethod::Hybrid,
        }
    };

    let f0 = system.call(&x0);
    if !all_finite(&f0) {
        return finish(x0, 0, false, "Residual is not finite at the initial point.".to_string());
    }
    if f0.norm() <= config.tolerance {
        return finish(x0, 0, true, "The solution converged.".to_string());
    }

    let y0: Vec<f64> = x0.iter().map(|v| v / config.variable_scale).collect();
    let mut solver = SolverDriver::builder(&system).with_initial(y0.clone()).build();
    let mut y = y0;
    let mut iterations = 0;

    loop {
        if system.evaluations.get() >= max_evaluations {
            let message = "The number of calls to function has reached maxfev.".to_string();
            return finish(system.unscale(&y), iterations, false, message);
        }
        match solver.next() {
            Ok((accepted, norm)) => {
                y = accepted.to_vec();
                iterations += 1;
                trace!(iterations = iterations, norm = norm, "trust-region step");
                if !norm.is_finite() {
                    let message = "Residual became non-finite.".to_string();
                    return finish(system.unscale(&y), iterations, false, message);
                }
                if norm <= config.tolerance {
                    let message = "The solution converged.".to_string();
                    return finish(system.unscale(&y), iterations, true, message);
                }
            }
            Err(err) => {
                let message = format!("The iteration is not making good progress: {err}.");
                return finish(system.unscale(&y), iterations, false, message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        let result = hybrid_solve(
            DVector::from_element(1, 1.0),
            |x| DVector::from_element(1, x[0] * x[0] - 2.0),
            &HybridConfig::default(),
        );
        assert!(result.converged, "{}", result.message);
        assert!((result.x[0] - 2.0_f64.sqrt()).abs() < 1e-8);
        assert_eq!(result.method, RootMethod::Hybrid);
    }

    #[test]
    fn coupled_nonlinear_system() {
        let residual = |x: &DVector<f64>| {
            DVector::from_vec(vec![x[0] + 0.5 * (x[0] - x[1]).powi(3) - 1.0, 0.5 * (x[1] - x[0]).powi(3) + x[1]])
        };
        let result = hybrid_solve(DVector::from_vec(vec![0.0, 0.0]), residual, &HybridConfig::default());
        assert!(result.converged, "{}", result.message);
        assert!(result.residual_norm <= 1e-10);
    }

    #[test]
    fn scaled_unknowns_reach_the_same_root() {
        let residual = |x: &DVector<f64>| DVector::from_vec(vec![x[0] - 0.3, x[0] + x[1] - 1.0]);
        let config = HybridConfig {
            variable_scale: 67.0,
            ..HybridConfig::default()
        };
        let result = hybrid_solve(DVector::from_vec(vec![0.0, 0.0]), residual, &config);
        assert!(result.converged, "{}", result.message);
        assert!((result.x[0] - 0.3).abs() < 1e-9);
        assert!((result.x[1] - 0.7).abs() < 1e-9);
    }

    #[test]
    fn reports_budget_exhaustion() {
        let config = HybridConfig {
            max_evaluations: Some(1),
            ..HybridConfig::default()
        };
        let result = hybrid_solve(
            DVector::from_element(1, 5.0),
            |x| DVector::from_element(1, x[0].exp() - 1.0),
            &config,
        );
        assert!(!result.converged);
        assert!(result.message.contains("maxfev"));
        assert_eq!(result.x[0], 5.0);
    }

    #[test]
    fn non_finite_start_is_reported() {
        let result = hybrid_solve(
            DVector::from_element(1, -1.0),
            |x| DVector::from_element(1, x[0].sqrt()),
            &HybridConfig::default(),
        );
        assert!(!result.converged);
        assert_eq!(result.iterations, 0);
    }
}
