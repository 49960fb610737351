use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{ConfigError, ExperimentConfig};

/// Default location of the generated dataset.
pub const DEFAULT_DATASET: &str = "data/ab_test_data.csv";
/// Default directory for analysis artifacts.
pub const DEFAULT_RESULTS_DIR: &str = "results";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Simulate a session dataset and write it as CSV.
    Generate,
    /// Run the test suite on a session CSV.
    Analyze,
}

#[derive(Debug)]
pub struct CliOptions {
    pub command: Command,
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub n_users: Option<usize>,
    pub sessions_mean: Option<f64>,
    pub n_boot: Option<usize>,
    pub bootstrap_seed: Option<u64>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl CliOptions {
    fn new(command: Command) -> Self {
        Self {
            command,
            config: None,
            preset: None,
            seed: None,
            n_users: None,
            sessions_mean: None,
            n_boot: None,
            bootstrap_seed: None,
            input: None,
            output: None,
        }
    }

    /// Loads the experiment from `--config`, `--preset`, or the baseline, then
    /// applies the command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the config file or preset cannot be loaded.
    pub fn load_config(&self) -> Result<ExperimentConfig, ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => ExperimentConfig::from_toml_file(path)?,
            (None, Some(name)) => ExperimentConfig::from_preset(name)?,
            (None, None) => ExperimentConfig::baseline(),
        };
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    pub fn apply_overrides(&self, cfg: &mut ExperimentConfig) {
        if let Some(seed) = self.seed {
            cfg.generator.seed = seed;
        }
        if let Some(n) = self.n_users {
            cfg.generator.n_users = n;
        }
        if let Some(mean) = self.sessions_mean {
            cfg.generator.sessions_per_user_mean = mean;
        }
        if let Some(n) = self.n_boot {
            cfg.analysis.n_boot = n;
        }
        if let Some(seed) = self.bootstrap_seed {
            cfg.analysis.bootstrap_seed = seed;
        }
    }

    /// Dataset read by `analyze`.
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or(Path::new(DEFAULT_DATASET))
    }

    /// Dataset file for `generate`, artifact directory for `analyze`.
    pub fn output_path(&self) -> &Path {
        match (&self.output, self.command) {
            (Some(p), _) => p.as_path(),
            (None, Command::Generate) => Path::new(DEFAULT_DATASET),
            (None, Command::Analyze) => Path::new(DEFAULT_RESULTS_DIR),
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let Some(first) = args.first() else {
        return Err("missing command (expected `generate` or `analyze`)".to_string());
    };
    let command = match first.as_str() {
        "generate" => Command::Generate,
        "analyze" => Command::Analyze,
        "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        other => return Err(format!("unknown command: {other}")),
    };
    parse_options(command, &args[1..])
}

fn parse_options(command: Command, args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::new(command);

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                set_once(&mut opts.config, PathBuf::from(path), flag)?;
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                set_once(&mut opts.preset, name.to_string(), flag)?;
            }
            "--seed" => {
                i += 1;
                set_once(&mut opts.seed, parse_value(args, i, flag)?, flag)?;
            }
            "--n-users" => {
                i += 1;
                set_once(&mut opts.n_users, parse_value(args, i, flag)?, flag)?;
            }
            "--sessions-mean" => {
                i += 1;
                set_once(&mut opts.sessions_mean, parse_value(args, i, flag)?, flag)?;
            }
            "--n-boot" => {
                i += 1;
                set_once(&mut opts.n_boot, parse_value(args, i, flag)?, flag)?;
            }
            "--bootstrap-seed" => {
                i += 1;
                set_once(&mut opts.bootstrap_seed, parse_value(args, i, flag)?, flag)?;
            }
            "--input" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --input (expected a CSV path)")?;
                set_once(&mut opts.input, PathBuf::from(path), flag)?;
            }
            "--output" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --output (expected a path)")?;
                set_once(&mut opts.output, PathBuf::from(path), flag)?;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    match command {
        Command::Generate if opts.input.is_some() => {
            Err("`--input` only applies to `analyze`".to_string())
        }
        Command::Generate if opts.n_boot.is_some() || opts.bootstrap_seed.is_some() => {
            Err("bootstrap options only apply to `analyze`".to_string())
        }
        Command::Analyze if opts.n_users.is_some() || opts.sessions_mean.is_some() => {
            Err("`--n-users` and `--sessions-mean` only apply to `generate`".to_string())
        }
        _ => Ok(opts),
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

fn parse_value<T: FromStr>(args: &[String], index: usize, flag: &str) -> Result<T, String> {
    let raw = args.next_or_err(index, &format!("missing value for {flag}"))?;
    raw.parse()
        .map_err(|_| format!("{flag} value \"{raw}\" is not valid"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  smart-charge-ab generate [--config <path> | --preset <name>] [--seed <u64>] \
         [--n-users <n>] [--sessions-mean <x>] [--output <csv>]"
    );
    eprintln!(
        "  smart-charge-ab analyze  [--config <path> | --preset <name>] [--input <csv>] \
         [--output <dir>] [--n-boot <n>] [--bootstrap-seed <u64>]"
    );
    eprintln!();
    eprintln!("Presets: {}", ExperimentConfig::PRESETS.join(", "));
}
