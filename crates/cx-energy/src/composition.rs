//! Explicit compositions with an implicit solvent component.

/// Most negative fraction still accepted as inside the simplex.
pub const DEFAULT_FEASIBILITY_SLACK: f64 = 1e-9;

/// Borrowed view of an explicit composition expanded with its implicit solvent.
///
/// For N explicit fractions the expanded vector has N+1 entries; the last one is the
/// solvent fraction `1 - sum(explicit)`. No allocation is made, so models can use it
/// on every oracle call.
#[derive(Debug, Clone, Copy)]
pub struct Composition<'a> {
    explicit: &'a [f64],
    solvent: f64,
}

impl<'a> Composition<'a> {
    /// Expand explicit fractions, computing the solvent fraction.
    pub fn from_explicit(explicit: &'a [f64]) -> Self {
        let solvent = 1.0 - explicit.iter().sum::<f64>();
        Self { explicit, solvent }
    }

    /// Number of entries in the expanded vector (N+1).
    pub fn len(&self) -> usize {
        self.explicit.len() + 1
    }

    /// Always false: the solvent entry is present even for N = 0.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn solvent(&self) -> f64 {
        self.solvent
    }

    /// Iterate over all N+1 fractions, solvent last.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.explicit
            .iter()
            .copied()
            .chain(std::iter::once(self.solvent))
    }

    /// Whether every explicit and implicit fraction is `>= -slack`.
    pub fn is_feasible(&self, slack: f64) -> bool {
        self.iter().all(|x| x >= -slack)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}
