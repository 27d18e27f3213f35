use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::oszicar::OszicarError;
use crate::core::io::outcar::OutcarError;
use crate::core::io::poscar::PoscarError;
use crate::core::io::wait::WaitError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Missing precondition: {what} not found at '{path}'", path = path.display())]
    Precondition { what: &'static str, path: PathBuf },

    #[error("Failed to read reference structure '{path}': {source}", path = path.display())]
    Structure {
        path: PathBuf,
        #[source]
        source: PoscarError,
    },

    #[error("Failed to stage simulator input '{path}': {source}", path = path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch simulator command '{command}': {source}")]
    SimulatorLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Simulator process failed ({status})")]
    SimulatorFailed { status: String },

    #[error(transparent)]
    MissingOutput(#[from] WaitError),

    #[error("Failed to parse pressure log: {0}")]
    PressureLog(#[from] OutcarError),

    #[error("Failed to parse step log: {0}")]
    TemperatureLog(#[from] OszicarError),

    #[error("No pressure samples available for trial volume {volume}")]
    NoPressureData { volume: f64 },

    #[error("Result log error: {0}")]
    RecordLog(#[from] csv::Error),

    #[error("Invalid search configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True for failures that indicate a broken run environment rather than a
    /// failed trial, so callers can word diagnostics accordingly.
    pub fn is_precondition(&self) -> bool {
        matches!(self, EngineError::Precondition { .. })
    }
}
