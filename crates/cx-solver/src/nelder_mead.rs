//! Nelder–Mead minimization through `argmin`.
//!
//! The initial simplex is built from the starting point alone, so equal inputs always
//! produce equal outputs. Objective values of `+inf` sort as the worst vertex, which
//! is how infeasible compositions are rejected.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;
use nalgebra::DVector;
use std::cell::Cell;
use tracing::debug;

/// Relative perturbation of non-zero coordinates for the initial simplex.
const NONZERO_DELTA: f64 = 0.05;
/// Absolute perturbation of zero coordinates for the initial simplex.
const ZERO_DELTA: f64 = 0.00025;

/// Nelder–Mead configuration.
#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    /// Converged once the standard deviation of the vertex values drops below this
    pub tolerance: f64,
    /// Iteration budget (defaults to 200 * n)
    pub max_iterations: Option<usize>,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-16,
            max_iterations: None,
        }
    }
}

/// Nelder–Mead result.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best vertex
    pub x: DVector<f64>,
    /// Objective at `x`
    pub fx: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// Whether the tolerance was met before the budget ran out
    pub converged: bool,
}

struct Objective<'a, F> {
    f: F,
    evaluations: &'a Cell<usize>,
}

impl<F> CostFunction for Objective<'_, F>
where
    F: Fn(&DVector<f64>) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        self.evaluations.set(self.evaluations.get() + 1);
        Ok((self.f)(&DVector::from_column_slice(param)))
    }
}

/// `x0` plus one vertex per coordinate, that coordinate nudged upwards.
fn initial_simplex(x0: &DVector<f64>) -> Vec<Vec<f64>> {
    let base: Vec<f64> = x0.iter().copied().collect();
    let mut simplex = Vec::with_capacity(base.len() + 1);
    simplex.push(base.clone());
    for k in 0..base.len() {
        let mut vertex = base.clone();
        vertex[k] = if vertex[k] != 0.0 {
            (1.0 + NONZERO_DELTA) * vertex[k]
        } else {
            ZERO_DELTA
        };
        simplex.push(vertex);
    }
    simplex
}

/// Minimize `f` starting from `x0`.
///
/// Never fails: a run that `argmin` aborts comes back as a non-converged result at
/// `x0` with an infinite objective.
pub fn nelder_mead<F>(x0: &DVector<f64>, f: F, config: &NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&DVector<f64>) -> f64,
{
    let n = x0.len();
    let max_iterations = config.max_iterations.unwrap_or(200 * n);
    let evaluations = Cell::new(0_usize);
    let aborted = |err: Error, evaluations: usize| {
        debug!(error = %err, "Nelder-Mead run aborted");
        NelderMeadResult {
            x: x0.clone(),
            fx: f64::INFINITY,
            iterations: 0,
            evaluations,
            converged: false,
        }
    };

    let solver = match NelderMead::new(initial_simplex(x0)).with_sd_tolerance(config.tolerance) {
        Ok(solver) => solver,
        Err(err) => return aborted(err, 0),
    };
    let objective = Objective {
        f,
        evaluations: &evaluations,
    };
    let run = Executor::new(objective, solver)
        .configure(|state| state.max_iters(max_iterations as u64))
        .run();

    match run {
        Ok(result) => {
            let state = result.state();
            let converged = matches!(
                state.get_termination_reason(),
                Some(TerminationReason::SolverConverged)
            );
            match state.get_best_param() {
                Some(best) => NelderMeadResult {
                    x: DVector::from_column_slice(best),
                    fx: state.get_best_cost(),
                    iterations: state.get_iter() as usize,
                    evaluations: evaluations.get(),
                    converged,
                },
                None => aborted(Error::msg("no best vertex recorded"), evaluations.get()),
            }
        }
        Err(err) => aborted(err, evaluations.get()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_bowl() {
        let f = |x: &DVector<f64>| (x[0] - 1.0).powi(2) + 10.0 * (x[1] + 0.5).powi(2);
        let result = nelder_mead(&DVector::from_vec(vec![0.0, 0.0]), f, &NelderMeadConfig {
            tolerance: 1e-14,
            max_iterations: Some(2000),
        });
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-5, "x = {}", result.x);
        assert!((result.x[1] + 0.5).abs() < 1e-5, "x = {}", result.x);
    }

    #[test]
    fn simplex_nudges_each_coordinate() {
        let simplex = initial_simplex(&DVector::from_vec(vec![0.2, 0.0]));
        assert_eq!(simplex.len(), 3);
        assert_eq!(simplex[0], vec![0.2, 0.0]);
        assert!((simplex[1][0] - 0.21).abs() < 1e-15);
        assert_eq!(simplex[2], vec![0.2, ZERO_DELTA]);
    }

    #[test]
    fn infinite_barrier_keeps_best_feasible() {
        let f = |x: &DVector<f64>| {
            if x[0] < 0.0 {
                f64::INFINITY
            } else {
                (x[0] + 1.0).powi(2)
            }
        };
        let result = nelder_mead(&DVector::from_element(1, 0.5), f, &NelderMeadConfig::default());
        assert!(result.x[0] >= 0.0);
        assert!(result.fx.is_finite());
        assert!(result.x[0] < 1e-3, "x = {}", result.x[0]);
    }

    #[test]
    fn is_deterministic() {
        let f = |x: &DVector<f64>| (x[0] - 0.3).powi(2) + (x[0] * x[1] - 0.1).powi(2);
        let x0 = DVector::from_vec(vec![0.5, 0.5]);
        let a = nelder_mead(&x0, f, &NelderMeadConfig::default());
        let b = nelder_mead(&x0, f, &NelderMeadConfig::default());
        assert_eq!(a.x, b.x);
        assert_eq!(a.evaluations, b.evaluations);
    }

    #[test]
    fn budget_exhaustion_is_not_converged() {
        let f = |x: &DVector<f64>| (x[0] - 3.0).powi(2) + (x[1] + 2.0).powi(2);
        let result = nelder_mead(&DVector::from_vec(vec![0.5, 0.5]), f, &NelderMeadConfig {
            max_iterations: Some(3),
            ..NelderMeadConfig::default()
        });
        assert!(!result.converged);
        assert!(result.fx.is_finite());
        assert!(result.evaluations > 0);
    }
}
