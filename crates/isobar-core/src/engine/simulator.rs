use super::error::EngineError;
use super::staging::{self, MdParameters};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// External-simulator collaborator consumed by the trial runner.
///
/// `prepare_inputs` must be idempotent and derive the staged state solely from
/// the pristine reference structure; `run` blocks until the simulator process
/// finishes and fails on a nonzero exit status.
pub trait Simulator {
    fn prepare_inputs(&mut self, volume: f64, temperature: f64) -> Result<(), EngineError>;
    fn run(&mut self) -> Result<(), EngineError>;
}

/// Runs the simulator as a child process (typically an MPI launcher wrapping
/// the VASP binary) inside the staging directory.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
    reference_structure: PathBuf,
    md: MdParameters,
}

impl CommandSimulator {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        work_dir: impl Into<PathBuf>,
        reference_structure: impl Into<PathBuf>,
        md: MdParameters,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            work_dir: work_dir.into(),
            reference_structure: reference_structure.into(),
            md,
        }
    }

    /// Builds a simulator from a whitespace-separated launch line such as
    /// `"mpirun -np 16 vasp_std"`.
    pub fn from_launch_line(
        launch_line: &str,
        work_dir: impl Into<PathBuf>,
        reference_structure: impl Into<PathBuf>,
        md: MdParameters,
    ) -> Result<Self, EngineError> {
        let mut tokens = launch_line.split_whitespace();
        let program = tokens.next().ok_or(EngineError::Precondition {
            what: "simulator launch command",
            path: PathBuf::from(launch_line),
        })?;
        Ok(Self::new(
            program,
            tokens.map(str::to_string).collect(),
            work_dir,
            reference_structure,
            md,
        ))
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Simulator for CommandSimulator {
    fn prepare_inputs(&mut self, volume: f64, temperature: f64) -> Result<(), EngineError> {
        debug!(volume, temperature, "Staging simulator inputs");
        staging::stage_inputs(
            &self.work_dir,
            &self.reference_structure,
            volume,
            temperature,
            &self.md,
        )
    }

    fn run(&mut self) -> Result<(), EngineError> {
        let command_line = self.command_line();
        info!(command = %command_line, "Launching simulator");

        let stdout_path = self.work_dir.join("vasp.out");
        let stdout = File::create(&stdout_path).map_err(|source| EngineError::Staging {
            path: stdout_path,
            source,
        })?;
        let stderr = stdout
            .try_clone()
            .map_err(EngineError::Io)?;

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status()
            .map_err(|source| EngineError::SimulatorLaunch {
                command: command_line,
                source,
            })?;

        if !status.success() {
            return Err(EngineError::SimulatorFailed {
                status: status.to_string(),
            });
        }
        Ok(())
    }
}
