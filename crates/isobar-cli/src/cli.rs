use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III",
    version,
    about = "isobar - Finds the cell volume that reproduces a target pressure at a given temperature by bisecting over VASP molecular-dynamics runs.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    /// Simulation temperature in Kelvin.
    #[arg(value_name = "TEMPERATURE")]
    pub temperature: u32,

    /// Expected volume in cubic angstroms; the search bracket is centered here.
    #[arg(value_name = "VOLUME")]
    pub volume: u32,

    /// Target external pressure in kilobar; may be negative.
    #[arg(value_name = "PRESSURE", allow_negative_numbers = true)]
    pub target_pressure: f64,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory the simulator is staged and run in.
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub work_dir: PathBuf,

    /// Pristine reference structure file (defaults to POSCAR.init in the work directory).
    #[arg(short = 's', long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Half-width of the initial volume bracket around VOLUME.
    #[arg(long, value_name = "FLOAT")]
    pub half_width: Option<f64>,

    /// Maximum acceptable |observed - target| pressure, in kilobar.
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Bracket width below which the search stops regardless of tolerance.
    #[arg(long, value_name = "FLOAT")]
    pub convergence_width: Option<f64>,

    /// Maximum number of bisection iterations.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Simulator launch line, e.g. "mpirun -np 16 vasp_std".
    #[arg(long = "command", value_name = "CMD")]
    pub simulator_command: Option<String>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write the run log to this path instead of the default next to the trial log
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
