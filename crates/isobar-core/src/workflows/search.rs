use crate::engine::config::SearchConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::record;
use crate::engine::simulator::Simulator;
use crate::engine::state::{SearchState, TrialResult};
use crate::engine::trial::TrialRunner;
use tracing::{info, instrument, warn};

/// How the search terminated. `Converged` means the pressure tolerance was
/// met at the reported volume; `ConvergedByWidth` means the bracket collapsed
/// below the convergence width without the tolerance being confirmed there;
/// `Exhausted` means the iteration budget ran out and the reported volume is a
/// best-effort estimate. Hard failures never produce an outcome; they surface
/// as [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Converged,
    ConvergedByWidth,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub final_volume: f64,
    pub history: Vec<TrialResult>,
    pub anomalies: usize,
}

impl SearchOutcome {
    pub fn converged(&self) -> bool {
        matches!(
            self.status,
            SearchStatus::Converged | SearchStatus::ConvergedByWidth
        )
    }
}

/// Runs the full bisection search against a live simulator.
#[instrument(skip_all, name = "bisection_search")]
pub fn run<S: Simulator>(
    runner: &mut TrialRunner<'_, S>,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SearchOutcome, EngineError> {
    let temperature = config.temperature;
    bisect(
        |volume| runner.run_trial(volume, temperature),
        config,
        reporter,
    )
}

/// The bisection controller, generic over the trial evaluation so the
/// numeric behavior can be exercised against synthetic pressure functions.
///
/// Exploits the assumption that pressure is monotonically non-increasing in
/// volume: an observation above the target moves the lower bound up, anything
/// else moves the upper bound down. Observations that contradict the assumed
/// trend are counted and reported, never acted on.
pub fn bisect<F>(
    mut run_trial: F,
    config: &SearchConfig,
    reporter: &ProgressReporter,
) -> Result<SearchOutcome, EngineError>
where
    F: FnMut(f64) -> Result<TrialResult, EngineError>,
{
    config.validate()?;

    let mut state = SearchState::new(config.lower_bound, config.upper_bound);
    let mut history: Vec<TrialResult> = Vec::new();
    let mut anomalies = 0usize;

    reporter.report(Progress::SearchStart {
        lower: state.lower(),
        upper: state.upper(),
        target_pressure: config.target_pressure,
    });
    info!(
        lower = state.lower(),
        upper = state.upper(),
        target = config.target_pressure,
        tolerance = config.tolerance,
        "Starting bisection search"
    );

    let (status, final_volume) = loop {
        if state.iteration() > config.max_iterations {
            let estimate = next_candidate(&state, config);
            warn!(
                max_iterations = config.max_iterations,
                estimate, "Iteration budget spent without convergence"
            );
            break (SearchStatus::Exhausted, estimate);
        }

        let candidate = next_candidate(&state, config);
        reporter.report(Progress::TrialStart {
            iteration: state.iteration(),
            max_iterations: config.max_iterations,
            volume: candidate,
        });

        let trial = run_trial(candidate)?;
        let observed = trial
            .pressure
            .as_value()
            .ok_or(EngineError::NoPressureData { volume: candidate })?;
        reporter.report(Progress::TrialFinish { pressure: observed });

        if record::breaks_monotonic_trend(&history, candidate, observed) {
            anomalies += 1;
            warn!(
                volume = candidate,
                pressure = observed,
                "Observation breaks the monotonic pressure-volume trend"
            );
            reporter.report(Progress::Message(format!(
                "non-monotonic observation at V = {candidate:.0} (P = {observed:.2})"
            )));
        }
        history.push(trial);

        let deviation = (observed - config.target_pressure).abs();
        if deviation <= config.tolerance {
            info!(
                volume = candidate,
                pressure = observed,
                deviation,
                "Pressure tolerance met"
            );
            break (SearchStatus::Converged, candidate);
        }

        if observed > config.target_pressure {
            state.raise_lower(candidate);
        } else {
            state.drop_upper(candidate);
        }
        reporter.report(Progress::BracketNarrowed {
            lower: state.lower(),
            upper: state.upper(),
        });

        if state.width() <= config.convergence_width {
            let volume = next_candidate(&state, config);
            info!(
                width = state.width(),
                volume, "Bracket collapsed below the convergence width"
            );
            break (SearchStatus::ConvergedByWidth, volume);
        }

        state.advance();
    };

    reporter.report(Progress::SearchFinish);
    info!(?status, final_volume, trials = history.len(), "Search finished");

    Ok(SearchOutcome {
        status,
        final_volume,
        history,
        anomalies,
    })
}

/// Midpoint snapped by the rounding policy and clamped back into the bracket,
/// so a coarse rounding step can never move the candidate outside it.
fn next_candidate(state: &SearchState, config: &SearchConfig) -> f64 {
    config
        .rounding
        .apply(state.midpoint())
        .clamp(state.lower(), state.upper())
}
