use crate::cli::Cli;
use crate::error::{CliError, Result};
use isobar::core::io::wait::WaitPolicy;
use isobar::engine::config::{SearchConfig, SearchConfigBuilder, VolumeRounding};
use isobar::engine::staging::MdParameters;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HALF_WIDTH: f64 = 300.0;
pub const DEFAULT_SIMULATOR_COMMAND: &str = "vasp_std";
pub const DEFAULT_STRUCTURE_FILE: &str = "POSCAR.init";

/// Optional settings read from a TOML file; every field can be overridden
/// from the command line, which always wins.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub simulator: SimulatorSection,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SearchSection {
    pub half_width: Option<f64>,
    pub tolerance: Option<f64>,
    pub convergence_width: Option<f64>,
    pub max_iterations: Option<usize>,
    /// Volume rounding step; omit for integer rounding.
    pub rounding_step: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SimulatorSection {
    pub command: Option<String>,
    pub structure: Option<PathBuf>,
    pub md_steps: Option<usize>,
    pub md_timestep_fs: Option<f64>,
    pub poll_attempts: Option<u32>,
    pub poll_interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub work_dir: PathBuf,
    pub structure: PathBuf,
    pub simulator_command: String,
    pub md: MdParameters,
    pub wait: WaitPolicy,
    pub run_log: PathBuf,
}

/// Merges CLI arguments over the optional file config over built-in defaults.
pub fn resolve(cli: &Cli) -> Result<AppConfig> {
    let file = match &cli.config {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration file");
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    let half_width = cli
        .half_width
        .or(file.search.half_width)
        .unwrap_or(DEFAULT_HALF_WIDTH);
    if !half_width.is_finite() || half_width <= 0.0 {
        return Err(CliError::Argument(
            "half-width must be finite and positive".to_string(),
        ));
    }

    let rounding = match file.search.rounding_step {
        Some(step) => VolumeRounding::Step(step),
        None => VolumeRounding::Integer,
    };

    let mut builder = SearchConfigBuilder::new()
        .target_pressure(cli.target_pressure)
        .temperature(f64::from(cli.temperature))
        .centered_bracket(f64::from(cli.volume), half_width)
        .rounding(rounding);
    if let Some(tolerance) = cli.tolerance.or(file.search.tolerance) {
        builder = builder.tolerance(tolerance);
    }
    if let Some(width) = cli.convergence_width.or(file.search.convergence_width) {
        builder = builder.convergence_width(width);
    }
    if let Some(iterations) = cli.max_iterations.or(file.search.max_iterations) {
        builder = builder.max_iterations(iterations);
    }
    let search = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let structure = cli
        .structure
        .clone()
        .or(file.simulator.structure)
        .unwrap_or_else(|| cli.work_dir.join(DEFAULT_STRUCTURE_FILE));

    let simulator_command = cli
        .simulator_command
        .clone()
        .or(file.simulator.command)
        .unwrap_or_else(|| DEFAULT_SIMULATOR_COMMAND.to_string());

    let md_defaults = MdParameters::default();
    let md = MdParameters {
        steps: file.simulator.md_steps.unwrap_or(md_defaults.steps),
        timestep_fs: file
            .simulator
            .md_timestep_fs
            .unwrap_or(md_defaults.timestep_fs),
    };

    let wait_defaults = WaitPolicy::default();
    let wait = WaitPolicy {
        max_attempts: file
            .simulator
            .poll_attempts
            .unwrap_or(wait_defaults.max_attempts),
        interval: file
            .simulator
            .poll_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(wait_defaults.interval),
    };

    let run_log = cli.log_file.clone().unwrap_or_else(|| {
        cli.work_dir.join(format!(
            "isobar_T{}_P{}.log",
            cli.temperature, cli.target_pressure
        ))
    });

    Ok(AppConfig {
        search,
        work_dir: cli.work_dir.clone(),
        structure,
        simulator_command,
        md,
        wait,
        run_log,
    })
}
