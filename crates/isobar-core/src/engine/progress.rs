#[derive(Debug, Clone)]
pub enum Progress {
    SearchStart {
        lower: f64,
        upper: f64,
        target_pressure: f64,
    },
    TrialStart {
        iteration: usize,
        max_iterations: usize,
        volume: f64,
    },
    TrialFinish {
        pressure: f64,
    },
    BracketNarrowed {
        lower: f64,
        upper: f64,
    },
    SearchFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
