use super::error::EngineError;
use super::state::TrialResult;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Append-only tabular record of accepted trials.
///
/// One CSV row per trial (volume, pressure, temperature), flushed on every
/// append so a killed search leaves a readable log. The in-memory history
/// mirrors the file and feeds the anomaly check.
pub struct TrialLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: Vec<TrialResult>,
}

impl TrialLog {
    /// Deterministic log name derived from the run parameters, so repeated
    /// runs at the same conditions land in the same file name.
    pub fn file_name(temperature: f64, target_pressure: f64) -> String {
        format!("trials_T{}_P{}.csv", temperature, target_pressure)
    }

    pub fn create(
        dir: &Path,
        temperature: f64,
        target_pressure: f64,
    ) -> Result<Self, EngineError> {
        let path = dir.join(Self::file_name(temperature, target_pressure));
        let writer = csv::Writer::from_path(&path)?;
        info!(path = %path.display(), "Opened trial log");
        Ok(Self {
            path,
            writer,
            rows: Vec::new(),
        })
    }

    pub fn append(&mut self, result: &TrialResult) -> Result<(), EngineError> {
        self.writer.serialize(result)?;
        self.writer.flush()?;
        self.rows.push(result.clone());
        Ok(())
    }

    pub fn history(&self) -> &[TrialResult] {
        &self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// True when an observation breaks the assumed monotonic (non-increasing)
/// pressure-volume trend relative to any earlier accepted trial.
pub fn breaks_monotonic_trend(history: &[TrialResult], volume: f64, pressure: f64) -> bool {
    history.iter().any(|prior| {
        let Some(prior_pressure) = prior.pressure.as_value() else {
            return false;
        };
        (volume > prior.volume && pressure > prior_pressure)
            || (volume < prior.volume && pressure < prior_pressure)
    })
}

/// Copies a raw output artifact to a volume-labeled sibling
/// (e.g. `OUTCAR` to `OUTCAR.V3500`) for post-hoc inspection.
pub fn archive_artifact(work_dir: &Path, name: &str, volume: f64) -> Result<PathBuf, EngineError> {
    let source = work_dir.join(name);
    let target = work_dir.join(format!("{}.V{:.0}", name, volume));
    std::fs::copy(&source, &target)?;
    Ok(target)
}
