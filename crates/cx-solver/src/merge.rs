//! Collapse near-duplicate phases of an over-specified solve.
//!
//! Phases closer than a tolerance (Euclidean norm) are joined by an edge; every
//! connected component becomes one phase. Clustering is transitive, so a chain
//! A≈B≈C merges even when A and C are further apart than the tolerance.

use crate::error::{SolverError, SolverResult, check_len};
use nalgebra::DVector;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{NodeIndex, UnGraph};

/// Distance below which two phases are considered the same.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-6;

/// Distinct phases after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPhases {
    /// One representative per cluster, ordered by the lowest original index
    pub phases: Vec<DVector<f64>>,
    /// Volume fractions of phases 2..m', phase 1 taking the complement
    pub volume_fractions: DVector<f64>,
    /// Original phase indices of each cluster, ascending
    pub clusters: Vec<Vec<usize>>,
}

impl MergedPhases {
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// All volume fractions, phase 1 first.
    pub fn all_volume_fractions(&self) -> DVector<f64> {
        let first = 1.0 - self.volume_fractions.sum();
        DVector::from_iterator(
            self.phases.len(),
            std::iter::once(first).chain(self.volume_fractions.iter().copied()),
        )
    }
}

/// Merge phases within `tolerance` of each other.
///
/// `volume_fractions` holds phases 2..m as returned by the solver. The
/// representative of a cluster is its lowest-indexed phase, and the cluster's volume
/// fraction is the sum over its members (phase 1's fraction being `1 - Σ`).
pub fn merge_phases(
    phases: &[DVector<f64>],
    volume_fractions: &DVector<f64>,
    tolerance: f64,
) -> SolverResult<MergedPhases> {
    if phases.is_empty() {
        return Err(SolverError::InvalidInput {
            what: "no phases to merge".to_string(),
        });
    }
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(SolverError::InvalidInput {
            what: format!("merge tolerance must be non-negative and finite, got {tolerance}"),
        });
    }
    check_len("volume fractions", phases.len() - 1, volume_fractions.len())?;
    let components = phases[0].len();
    for phase in phases {
        check_len("phase", components, phase.len())?;
    }

    let mut graph: UnGraph<usize, ()> = UnGraph::default();
    let nodes: Vec<NodeIndex> = (0..phases.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..phases.len() {
        for j in (i + 1)..phases.len() {
            if (&phases[i] - &phases[j]).norm() < tolerance {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }

    // On an undirected graph the strongly connected components are the connected ones.
    let mut clusters: Vec<Vec<usize>> = tarjan_scc(&graph)
        .into_iter()
        .map(|component| {
            let mut members: Vec<usize> = component.into_iter().map(|n| graph[n]).collect();
            members.sort_unstable();
            members
        })
        .collect();
    clusters.sort_unstable_by_key(|members| members[0]);

    let all_fractions: Vec<f64> = std::iter::once(1.0 - volume_fractions.sum())
        .chain(volume_fractions.iter().copied())
        .collect();
    let merged_fractions: Vec<f64> = clusters
        .iter()
        .map(|members| members.iter().map(|&i| all_fractions[i]).sum())
        .collect();

    Ok(MergedPhases {
        phases: clusters.iter().map(|members| phases[members[0]].clone()).collect(),
        volume_fractions: DVector::from_iterator(
            clusters.len() - 1,
            merged_fractions.into_iter().skip(1),
        ),
        clusters,
    })
}
