use super::error::EngineError;
use super::record::{self, TrialLog};
use super::simulator::Simulator;
use super::staging::{PRESSURE_LOG_FILE, STEP_LOG_FILE};
use super::state::TrialResult;
use crate::core::io::oszicar::average_temperature_from_path;
use crate::core::io::outcar::average_pressure_from_path;
use crate::core::io::wait::{Sleeper, WaitPolicy, wait_for_path};
use std::path::PathBuf;
use tracing::{debug, info};

/// Executes one full simulate-and-measure cycle at a candidate volume.
///
/// Every failure is surfaced to the caller unchanged; no step is retried. A
/// trial that reaches the parser but finds no pressure samples fails with
/// [`EngineError::NoPressureData`], which is distinct from the simulator
/// crashing or its output never appearing.
pub struct TrialRunner<'a, S: Simulator> {
    simulator: &'a mut S,
    log: &'a mut TrialLog,
    work_dir: PathBuf,
    wait_policy: WaitPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a, S: Simulator> TrialRunner<'a, S> {
    pub fn new(
        simulator: &'a mut S,
        log: &'a mut TrialLog,
        work_dir: impl Into<PathBuf>,
        wait_policy: WaitPolicy,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            simulator,
            log,
            work_dir: work_dir.into(),
            wait_policy,
            sleeper,
        }
    }

    pub fn run_trial(
        &mut self,
        volume: f64,
        temperature: f64,
    ) -> Result<TrialResult, EngineError> {
        info!(volume, temperature, "Starting trial");

        self.simulator.prepare_inputs(volume, temperature)?;
        self.simulator.run()?;

        let pressure_log = self.work_dir.join(PRESSURE_LOG_FILE);
        let step_log = self.work_dir.join(STEP_LOG_FILE);
        wait_for_path(&pressure_log, self.wait_policy, self.sleeper)?;
        wait_for_path(&step_log, self.wait_policy, self.sleeper)?;

        let pressure = average_pressure_from_path(&pressure_log)?;
        let temperature_avg = average_temperature_from_path(&step_log)?;
        debug!(%pressure, %temperature_avg, "Parsed trial output");

        if pressure.is_unavailable() {
            return Err(EngineError::NoPressureData { volume });
        }

        record::archive_artifact(&self.work_dir, PRESSURE_LOG_FILE, volume)?;
        record::archive_artifact(&self.work_dir, STEP_LOG_FILE, volume)?;

        let result = TrialResult {
            volume,
            pressure,
            temperature: temperature_avg,
        };
        self.log.append(&result)?;
        info!(volume, %pressure, "Trial accepted");
        Ok(result)
    }
}
