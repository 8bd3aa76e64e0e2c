//! Free-energy oracle trait.

/// Scalar free-energy density of a mixture.
///
/// Implementations must be thread-safe (Send + Sync) so the per-phase minimizations of
/// one residual evaluation can run in parallel.
///
/// `free_energy` receives the N explicit fractions. It must never panic or fail: any
/// composition outside the simplex (including a solvent fraction below the feasibility
/// slack) evaluates to `f64::INFINITY`.
pub trait FreeEnergy: Send + Sync {
    /// Get the model name (for logging).
    fn name(&self) -> &str;

    /// Number of explicit components N.
    fn components(&self) -> usize;

    /// Free-energy density at `phi`, or `+inf` when infeasible.
    fn free_energy(&self, phi: &[f64]) -> f64;
}

/// Adapter turning a plain closure into a [`FreeEnergy`].
pub struct FnFreeEnergy<F> {
    name: String,
    components: usize,
    f: F,
}

impl<F> FnFreeEnergy<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, components: usize, f: F) -> Self {
        Self {
            name: name.into(),
            components,
            f,
        }
    }
}

impl<F> FreeEnergy for FnFreeEnergy<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn components(&self) -> usize {
        self.components
    }

    fn free_energy(&self, phi: &[f64]) -> f64 {
        if phi.len() != self.components {
            return f64::INFINITY;
        }
        (self.f)(phi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_adapter_evaluates() {
        let model = FnFreeEnergy::new("parabola", 2, |phi: &[f64]| {
            phi.iter().map(|x| (x - 0.2) * (x - 0.2)).sum()
        });
        assert_eq!(model.name(), "parabola");
        assert_eq!(model.components(), 2);
        assert!((model.free_energy(&[0.2, 0.3]) - 0.01).abs() < 1e-15);
        assert!(model.free_energy(&[0.2]).is_infinite());
    }
}
