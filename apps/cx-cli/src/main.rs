mod compile;
mod error;
mod report;

use clap::{Parser, Subcommand};
use cx_project::ProblemDef;
use cx_solver::{coex_exact, refine};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::compile::compile_problem;
use crate::error::{CliError, CliResult};

/// Bundled Li & Jacobs (2024) three-component problem.
const LI_JACOBS_2024: &str = include_str!("../../../demos/li_jacobs_2024.yaml");

#[derive(Parser)]
#[command(name = "cx-cli")]
#[command(about = "Coexist CLI - multi-phase coexistence of mixtures", long_about = None)]
struct Cli {
    /// Log solver progress at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate problem file syntax and shapes
    Validate {
        /// Path to the problem file (YAML, or JSON with a .json extension)
        problem_path: PathBuf,
    },
    /// Solve a coexistence problem
    Solve {
        /// Path to the problem file (YAML, or JSON with a .json extension)
        problem_path: PathBuf,
        /// Write the solution report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Run a single round even if the problem asks for refinement
        #[arg(long)]
        no_refine: bool,
        /// Minimize the phases of each residual evaluation in parallel
        #[arg(long)]
        parallel: bool,
    },
    /// Solve the bundled Li & Jacobs (2024) example
    Demo {
        /// Write the solution report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { problem_path } => cmd_validate(&problem_path),
        Commands::Solve {
            problem_path,
            json,
            no_refine,
            parallel,
        } => {
            let mut problem = load(&problem_path)?;
            if no_refine {
                problem.solver.refine = false;
            }
            if parallel {
                problem.solver.parallel = true;
            }
            cmd_solve(&problem, json.as_deref())
        }
        Commands::Demo { json } => {
            let problem = cx_project::parse_yaml(LI_JACOBS_2024)?;
            cmd_solve(&problem, json.as_deref())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load(problem_path: &Path) -> CliResult<ProblemDef> {
    cx_project::load_problem(problem_path).map_err(|source| CliError::ProblemFileRead {
        path: problem_path.to_path_buf(),
        source,
    })
}

fn cmd_validate(problem_path: &Path) -> CliResult<()> {
    println!("Validating problem: {}", problem_path.display());
    let problem = load(problem_path)?;
    compile_problem(&problem)?;
    println!(
        "✓ Problem is valid ({} components, {} phase guesses)",
        problem.components(),
        problem.guess.phases.len()
    );
    Ok(())
}

fn cmd_solve(problem: &ProblemDef, json: Option<&Path>) -> CliResult<()> {
    println!("Solving: {}", problem.name);
    let compiled = compile_problem(problem)?;

    let report = if compiled.refine {
        let outcome = refine(
            &compiled.model,
            &compiled.guess,
            &compiled.target,
            &compiled.config,
        )?;
        report::refined(&problem.name, &outcome, &compiled.target)
    } else {
        let solution = coex_exact(
            &compiled.model,
            &compiled.guess,
            &compiled.target,
            &compiled.config.coexistence,
        )?;
        report::single_round(&problem.name, &solution, &compiled.target)
    };

    report::print_report(&report);

    if let Some(path) = json {
        cx_project::save_report_json(path, &report)?;
        info!(path = %path.display(), "solution report written");
        println!("✓ Report written to {}", path.display());
    }
    Ok(())
}
