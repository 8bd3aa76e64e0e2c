//! Conversion of solver output into report records and terminal summaries.

use cx_project::schema::{RoundReport, SolutionReport};
use cx_solver::{CoexistenceSolution, RefineOutcome};
use nalgebra::DVector;

pub fn round_report(solution: &CoexistenceSolution, target: &DVector<f64>) -> RoundReport {
    let mass_balance_error = solution
        .mass_balance_error(target)
        .map(|err| err.iter().copied().collect())
        .unwrap_or_default();
    RoundReport {
        converged: solution.converged,
        message: solution.message.clone(),
        method: solution.method.to_string(),
        retried: solution.retried,
        phases: solution.phases.iter().map(|p| p.iter().copied().collect()).collect(),
        chemical_potential: solution.chemical_potential.iter().copied().collect(),
        volume_fractions: solution.all_volume_fractions().iter().copied().collect(),
        grand_potentials: solution.grand_potentials.clone(),
        mass_balance_error,
        residual_norm: solution.residual_norm,
        evaluations: solution.evaluations,
        inner_failures: solution.inner_failures,
    }
}

pub fn single_round(name: &str, solution: &CoexistenceSolution, target: &DVector<f64>) -> SolutionReport {
    SolutionReport {
        name: name.to_string(),
        target: target.iter().copied().collect(),
        rounds: vec![round_report(solution, target)],
        merged_clusters: None,
    }
}

pub fn refined(name: &str, outcome: &RefineOutcome, target: &DVector<f64>) -> SolutionReport {
    SolutionReport {
        name: name.to_string(),
        target: target.iter().copied().collect(),
        rounds: vec![
            round_report(&outcome.first_round, target),
            round_report(&outcome.second_round, target),
        ],
        merged_clusters: Some(outcome.merged.clusters.clone()),
    }
}

pub fn print_round(label: &str, round: &RoundReport) {
    let status = if round.converged { "✓" } else { "✗" };
    println!(
        "{} {}: {} ({}, {} evaluations{})",
        status,
        label,
        round.message,
        round.method,
        round.evaluations,
        if round.retried { ", retried" } else { "" }
    );
    for (k, (phase, vf)) in round.phases.iter().zip(&round.volume_fractions).enumerate() {
        println!("  phase {}: phi = {} vol = {:.6}", k + 1, format_vec(phase), vf);
    }
    println!("  mu = {}", format_vec(&round.chemical_potential));
    println!("  |diff| = {:e}", round.residual_norm);
    if round.inner_failures > 0 {
        println!("  inner minimizations without convergence: {}", round.inner_failures);
    }
}

pub fn print_report(report: &SolutionReport) {
    let last = report.rounds.len().saturating_sub(1);
    for (i, round) in report.rounds.iter().enumerate() {
        let label = if i == last { "Final" } else { "Intermediate" };
        print_round(label, round);
        if i == 0 {
            if let Some(clusters) = &report.merged_clusters {
                println!("  merged phases: {:?}", clusters);
            }
        }
    }
}

fn format_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.8e}")).collect();
    format!("[{}]", parts.join(", "))
}
