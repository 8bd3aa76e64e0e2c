//! End-to-end coexistence solves on regular-solution mixtures.

use cx_energy::{FreeEnergy, RegularSolution};
use cx_solver::{
    CoexistenceConfig, CoexistenceGuess, RefineConfig, RootMethod, coex_exact, merge_phases,
    refine,
};
use nalgebra::DVector;

fn quiet() -> CoexistenceConfig {
    CoexistenceConfig {
        verbose: false,
        ..CoexistenceConfig::default()
    }
}

#[test]
fn symmetric_binary_splits_into_binodal_phases() {
    let model = RegularSolution::symmetric_binary(3.0);
    let guess = CoexistenceGuess::from_rows(&[vec![0.1], vec![0.9]], &[0.0], &[0.3]);
    let target = DVector::from_element(1, 0.3);

    let solution = coex_exact(&model, &guess, &target, &quiet()).unwrap();

    assert!(solution.converged, "{}", solution.message);
    assert_eq!(solution.phase_count(), 2);
    // ln(φ / (1 - φ)) = χ (2φ - 1) at χ = 3
    assert!((solution.phases[0][0] - 0.070_7).abs() < 1e-3);
    assert!((solution.phases[1][0] - 0.929_3).abs() < 1e-3);
    assert!(solution.chemical_potential[0].abs() < 1e-4);

    let balance = solution.mass_balance_error(&target).unwrap();
    assert!(balance.amax() < 1e-6);
    let gap = (solution.grand_potentials[1] - solution.grand_potentials[0]).abs();
    assert!(gap < 1e-6);
    let fractions = solution.all_volume_fractions();
    assert!((fractions.sum() - 1.0).abs() < 1e-12);
    assert!(fractions.iter().all(|&v| v > 0.0 && v < 1.0));
}

#[test]
fn phases_are_minima_of_the_shared_grand_potential() {
    let model = RegularSolution::symmetric_binary(3.0);
    let guess = CoexistenceGuess::from_rows(&[vec![0.1], vec![0.9]], &[0.0], &[0.3]);
    let target = DVector::from_element(1, 0.3);

    let solution = coex_exact(&model, &guess, &target, &quiet()).unwrap();

    let mu = solution.chemical_potential[0];
    for phase in &solution.phases {
        let phi = phase[0];
        let omega = |p: f64| model.free_energy(&[p]) - mu * p;
        assert!(omega(phi) <= omega(phi + 1e-4));
        assert!(omega(phi) <= omega(phi - 1e-4));
    }
}

#[test]
fn li_jacobs_mixture_resolves_three_phases() {
    let model = RegularSolution::li_jacobs_2024();
    let guess = CoexistenceGuess::from_rows(
        &[
            vec![1e-8, 0.966_101_69, 0.016_949_15],
            vec![0.016_949_15, 0.016_949_15, 0.084_745_76],
            vec![0.016_949_15, 0.016_949_15, 0.067_796_61],
            vec![0.966_101_69, 1e-8, 0.016_949_15],
        ],
        &[0.070_048_7, 0.070_048_7, -1.289_294_41],
        &[0.45, 0.05, 0.25],
    );
    let target = DVector::from_vec(vec![0.25, 0.25, 0.05]);
    let config = RefineConfig {
        coexistence: quiet(),
        ..RefineConfig::default()
    };

    let outcome = refine(&model, &guess, &target, &config).unwrap();

    assert!(outcome.first_round.converged, "{}", outcome.first_round.message);
    assert_eq!(outcome.first_round.phase_count(), 4);
    assert_eq!(outcome.merged.phase_count(), 3);
    assert_eq!(outcome.merged.clusters, vec![vec![0], vec![1, 2], vec![3]]);
    let solution = outcome.solution();
    assert!(solution.converged, "{}", solution.message);
    assert!(!solution.retried);
    assert_eq!(solution.method, RootMethod::Hybrid);
    assert_eq!(solution.phase_count(), 3);

    let balance = solution.mass_balance_error(&target).unwrap();
    assert!(balance.amax() < 1e-6);
    let omega0 = solution.grand_potentials[0];
    let spread = solution
        .grand_potentials
        .iter()
        .map(|omega| (omega - omega0).abs())
        .fold(0.0, f64::max);
    assert!(spread < 1e-6, "grand potentials {:?}", solution.grand_potentials);

    // Mirror-symmetric mixture: the two dense phases swap components 1 and 2.
    let (dense_a, dense_b) = (&solution.phases[0], &solution.phases[2]);
    assert!(dense_a[1] > 0.9 && dense_b[0] > 0.9);
    assert!((dense_a[1] - dense_b[0]).abs() < 1e-4);
    assert!((solution.chemical_potential[0] - solution.chemical_potential[1]).abs() < 1e-4);

    // Re-merging the converged phases changes nothing.
    let again = merge_phases(
        &solution.phases,
        &solution.volume_fractions,
        config.merge_tolerance,
    )
    .unwrap();
    assert_eq!(again.phase_count(), 3);
}

#[test]
fn parallel_inner_minimization_matches_serial() {
    let model = RegularSolution::symmetric_binary(3.0);
    let guess = CoexistenceGuess::from_rows(&[vec![0.1], vec![0.9]], &[0.0], &[0.3]);
    let target = DVector::from_element(1, 0.3);

    let serial = coex_exact(&model, &guess, &target, &quiet()).unwrap();
    let parallel = coex_exact(
        &model,
        &guess,
        &target,
        &CoexistenceConfig {
            parallel: true,
            ..quiet()
        },
    )
    .unwrap();

    assert_eq!(serial.phases, parallel.phases);
    assert_eq!(serial.chemical_potential, parallel.chemical_potential);
    assert_eq!(serial.evaluations, parallel.evaluations);
}
