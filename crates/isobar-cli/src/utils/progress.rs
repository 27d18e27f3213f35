use indicatif::{ProgressBar, ProgressStyle};
use isobar::engine::progress::{Progress, ProgressCallback};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// Bridges the engine's progress events onto an indicatif spinner. A trial is
/// dominated by the external simulator run, so there is no meaningful step
/// count to draw a bar from; the spinner carries the bracket state instead.
#[derive(Clone)]
pub struct SearchProgressHandler {
    pb: Arc<Mutex<ProgressBar>>,
}

impl SearchProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new_spinner()
            .with_style(Self::spinner_style())
            .with_message("Waiting for search to start...");
        pb.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        pb.disable_steady_tick();
        pb.finish_and_clear();

        Self {
            pb: Arc::new(Mutex::new(pb)),
        }
    }

    pub fn callback(&self) -> ProgressCallback<'static> {
        let pb_clone = self.pb.clone();

        Box::new(move |progress: Progress| {
            let Ok(pb) = pb_clone.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::SearchStart {
                    lower,
                    upper,
                    target_pressure,
                } => {
                    pb.reset();
                    pb.set_style(Self::spinner_style());
                    pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                    pb.set_message(format!(
                        "Searching [{lower:.0}, {upper:.0}] for P = {target_pressure} kB"
                    ));
                }
                Progress::TrialStart {
                    iteration,
                    max_iterations,
                    volume,
                } => {
                    pb.set_message(format!(
                        "Trial {iteration}/{max_iterations}: simulating at V = {volume:.0}"
                    ));
                }
                Progress::TrialFinish { pressure } => {
                    pb.println(format!("  measured P = {pressure:.2} kB"));
                }
                Progress::BracketNarrowed { lower, upper } => {
                    pb.set_message(format!("Bracket narrowed to [{lower:.0}, {upper:.0}]"));
                }
                Progress::SearchFinish => {
                    pb.disable_steady_tick();
                    pb.finish_with_message("✓ Done");
                }
                Progress::Message(msg) => {
                    if !pb.is_finished() {
                        pb.println(format!("  {}", msg));
                    } else {
                        pb.set_message(msg);
                    }
                }
            }
        })
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .expect("Failed to create spinner style template")
    }
}

impl Default for SearchProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
