use cx_project::schema::*;
use cx_project::{load_json, load_problem, load_yaml, save_json, save_yaml, validate_problem};
use std::path::{Path, PathBuf};

fn demos() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

#[test]
fn demos_load_and_validate() {
    for name in ["li_jacobs_2024.yaml", "symmetric_binary.json"] {
        let path = demos().join(name);
        let problem =
            load_problem(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        validate_problem(&problem).unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
    }
}

#[test]
fn li_jacobs_demo_shapes() {
    let problem = load_yaml(&demos().join("li_jacobs_2024.yaml")).unwrap();

    assert_eq!(problem.components(), 3);
    assert_eq!(problem.target, vec![0.25, 0.25, 0.05]);
    assert_eq!(problem.guess.phases.len(), 4);
    assert_eq!(problem.guess.volume_fractions.len(), 3);
    assert!(problem.solver.refine);
    assert!(!problem.solver.retry_on_failure);
}

#[test]
fn roundtrip_yaml_and_json() {
    let problem = load_json(&demos().join("symmetric_binary.json")).unwrap();
    let temp_dir = std::env::temp_dir();

    let yaml_path = temp_dir.join("cx_project_roundtrip.yaml");
    save_yaml(&yaml_path, &problem).unwrap();
    assert_eq!(load_yaml(&yaml_path).unwrap(), problem);

    let json_path = temp_dir.join("cx_project_roundtrip.json");
    save_json(&json_path, &problem).unwrap();
    assert_eq!(load_json(&json_path).unwrap(), problem);
}

#[test]
fn save_refuses_invalid_problem() {
    let mut problem = load_json(&demos().join("symmetric_binary.json")).unwrap();
    problem.guess.chemical_potential.clear();

    let path = std::env::temp_dir().join("cx_project_invalid.yaml");
    assert!(save_yaml(&path, &problem).is_err());
}

#[test]
fn report_serializes_rounds() {
    let round = RoundReport {
        converged: true,
        message: "The solution converged.".to_string(),
        method: "hybr".to_string(),
        retried: false,
        phases: vec![vec![0.07], vec![0.93]],
        chemical_potential: vec![0.0],
        volume_fractions: vec![0.73, 0.27],
        grand_potentials: vec![-0.1, -0.1],
        mass_balance_error: vec![1e-10],
        residual_norm: 1e-10,
        evaluations: 12,
        inner_failures: 0,
    };
    let report = SolutionReport {
        name: "binary".to_string(),
        target: vec![0.3],
        rounds: vec![round.clone()],
        merged_clusters: None,
    };

    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("merged_clusters"));
    let back: SolutionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.final_round(), Some(&round));
}
