//! Command-line entry point: `generate` a dataset or `analyze` one.

use std::process;

use smart_charge_ab::analysis::AnalysisReport;
use smart_charge_ab::cli::{self, CliOptions, Command};
use smart_charge_ab::config::ExperimentConfig;
use smart_charge_ab::io::dataset::{export_sessions, load_sessions};
use smart_charge_ab::io::export::export_artifacts;
use smart_charge_ab::sim::generate_experiment;
use smart_charge_ab::telemetry;

fn load_config(opts: &CliOptions) -> ExperimentConfig {
    let cfg = match opts.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

fn run_generate(opts: &CliOptions, cfg: &ExperimentConfig) {
    let experiment = match generate_experiment(cfg) {
        Ok(exp) => exp,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    let path = opts.output_path();
    if let Err(e) = export_sessions(&experiment.sessions, path) {
        eprintln!("error: failed to write dataset: {e}");
        process::exit(1);
    }
    println!(
        "Generated {} sessions for {} users -> {}",
        experiment.sessions.len(),
        experiment.users.len(),
        path.display()
    );
    println!("True uplift in low_share: {:.4}", experiment.true_uplift);
}

fn run_analyze(opts: &CliOptions, cfg: &ExperimentConfig) {
    let input = opts.input_path();
    let sessions = match load_sessions(input) {
        Ok(sessions) => sessions,
        Err(e) => {
            eprintln!("error: failed to load {}: {e}", input.display());
            process::exit(1);
        }
    };

    let report = AnalysisReport::run(&sessions, &cfg.analysis);
    println!("{report}");

    let dir = opts.output_path();
    if let Err(e) = export_artifacts(&report, dir) {
        eprintln!("error: failed to write artifacts: {e}");
        process::exit(1);
    }
    println!("\nArtifacts saved to {}", dir.display());
}

fn main() {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(1);
        }
    };
    telemetry::init_tracing();

    let cfg = load_config(&opts);
    match opts.command {
        Command::Generate => run_generate(&opts, &cfg),
        Command::Analyze => run_analyze(&opts, &cfg),
    }
}
