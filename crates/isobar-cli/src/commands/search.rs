use crate::cli::Cli;
use crate::config::AppConfig;
use crate::error::Result;
use crate::utils::progress::SearchProgressHandler;
use isobar::core::io::wait::ThreadSleeper;
use isobar::engine::error::EngineError;
use isobar::engine::progress::ProgressReporter;
use isobar::engine::record::TrialLog;
use isobar::engine::simulator::CommandSimulator;
use isobar::engine::trial::TrialRunner;
use isobar::workflows::search::{self, SearchOutcome, SearchStatus};
use std::process::ExitCode;
use tracing::info;

/// Exit codes distinguishing the four terminal conditions: 0 tolerance met,
/// 3 bracket collapsed without confirming the tolerance, 4 iteration budget
/// spent, 1 hard failure (2 is claimed by usage errors).
pub fn status_exit_code(status: SearchStatus) -> u8 {
    match status {
        SearchStatus::Converged => 0,
        SearchStatus::ConvergedByWidth => 3,
        SearchStatus::Exhausted => 4,
    }
}

pub fn run(cli: &Cli, app: &AppConfig) -> Result<ExitCode> {
    if !app.structure.exists() {
        return Err(EngineError::Precondition {
            what: "reference structure",
            path: app.structure.clone(),
        }
        .into());
    }

    let mut simulator = CommandSimulator::from_launch_line(
        &app.simulator_command,
        &app.work_dir,
        &app.structure,
        app.md.clone(),
    )?;
    let mut log = TrialLog::create(
        &app.work_dir,
        app.search.temperature,
        app.search.target_pressure,
    )?;

    let progress_handler = SearchProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.callback());
    let sleeper = ThreadSleeper;
    let mut runner = TrialRunner::new(
        &mut simulator,
        &mut log,
        &app.work_dir,
        app.wait,
        &sleeper,
    );

    println!(
        "Searching for V(P = {} kB) at T = {} K in [{:.0}, {:.0}]...",
        app.search.target_pressure,
        cli.temperature,
        app.search.lower_bound,
        app.search.upper_bound
    );
    info!("Invoking the bisection search workflow...");

    let outcome = search::run(&mut runner, &app.search, &reporter)?;

    report_outcome(&outcome, &log);
    Ok(ExitCode::from(status_exit_code(outcome.status)))
}

fn report_outcome(outcome: &SearchOutcome, log: &TrialLog) {
    match outcome.status {
        SearchStatus::Converged => {
            println!(
                "✓ Converged: V = {:.0} meets the pressure tolerance ({} trials).",
                outcome.final_volume,
                outcome.history.len()
            );
        }
        SearchStatus::ConvergedByWidth => {
            println!(
                "✓ Bracket collapsed at V = {:.0}; pressure tolerance not confirmed there ({} trials).",
                outcome.final_volume,
                outcome.history.len()
            );
        }
        SearchStatus::Exhausted => {
            println!(
                "⚠ Iteration budget spent. Best-effort estimate: V = {:.0} ({} trials).",
                outcome.final_volume,
                outcome.history.len()
            );
        }
    }
    if outcome.anomalies > 0 {
        println!(
            "⚠ {} observation(s) broke the monotonic pressure-volume trend; inspect the trial log.",
            outcome.anomalies
        );
    }
    println!("Trial log: {}", log.path().display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn exit_codes_distinguish_every_terminal_state() {
        assert_eq!(status_exit_code(SearchStatus::Converged), 0);
        assert_eq!(status_exit_code(SearchStatus::ConvergedByWidth), 3);
        assert_eq!(status_exit_code(SearchStatus::Exhausted), 4);
    }

    #[test]
    fn missing_structure_aborts_before_any_staging() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "isobar",
            "3500",
            "3500",
            "50",
            "--work-dir",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        let app = crate::config::resolve(&cli).unwrap();

        let err = run(&cli, &app).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::Engine(EngineError::Precondition { .. })
        ));
        // Nothing was staged or logged.
        assert!(!dir.path().join("INCAR").exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
