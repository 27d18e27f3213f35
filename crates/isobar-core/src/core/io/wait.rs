use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Output artifact '{path}' did not appear within {attempts} poll attempts",
        path = path.display())]
    TimedOut { path: PathBuf, attempts: u32 },
}

/// Blocking-sleep dependency, injectable so tests can poll without real delays.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the OS clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Retry budget for artifacts the simulator writes asynchronously.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            interval: Duration::from_secs(10),
        }
    }
}

/// Waits for `path` to exist, polling at a fixed interval with a hard attempt
/// ceiling. The first check happens immediately; sleeps occur only between
/// attempts.
pub fn wait_for_path(path: &Path, policy: WaitPolicy, sleeper: &dyn Sleeper) -> Result<(), WaitError> {
    for attempt in 0..policy.max_attempts {
        if path.exists() {
            return Ok(());
        }
        if attempt + 1 < policy.max_attempts {
            sleeper.sleep(policy.interval);
        }
    }
    Err(WaitError::TimedOut {
        path: path.to_path_buf(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Fake sleeper that records every requested sleep instead of blocking.
    struct RecordingSleeper {
        naps: RefCell<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn new() -> Self {
            Self {
                naps: RefCell::new(Vec::new()),
            }
        }

        fn count(&self) -> usize {
            self.naps.borrow().len()
        }
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration) {
            self.naps.borrow_mut().push(duration);
        }
    }

    fn policy(max_attempts: u32) -> WaitPolicy {
        WaitPolicy {
            max_attempts,
            interval: Duration::from_millis(5),
        }
    }

    #[test]
    fn existing_path_returns_without_sleeping() {
        let dir = tempfile::tempdir().unwrap();
        let sleeper = RecordingSleeper::new();

        wait_for_path(dir.path(), policy(30), &sleeper).unwrap();
        assert_eq!(sleeper.count(), 0);
    }

    #[test]
    fn missing_path_exhausts_the_full_budget() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("OUTCAR");
        let sleeper = RecordingSleeper::new();

        let err = wait_for_path(&missing, policy(30), &sleeper).unwrap_err();
        assert!(matches!(err, WaitError::TimedOut { attempts: 30, .. }));
        // No sleep after the final failed check.
        assert_eq!(sleeper.count(), 29);
    }

    #[test]
    fn sleeps_use_the_configured_interval() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("OSZICAR");
        let sleeper = RecordingSleeper::new();

        let _ = wait_for_path(&missing, policy(3), &sleeper);
        assert_eq!(*sleeper.naps.borrow(), vec![Duration::from_millis(5); 2]);
    }

    #[test]
    fn file_appearing_between_polls_is_found() {
        // The sleeper side-channel creates the file during the first nap,
        // standing in for the simulator writing output asynchronously.
        struct CreatingSleeper {
            target: PathBuf,
        }
        impl Sleeper for CreatingSleeper {
            fn sleep(&self, _: Duration) {
                std::fs::write(&self.target, b"done").unwrap();
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("OUTCAR");
        let sleeper = CreatingSleeper {
            target: target.clone(),
        };

        wait_for_path(&target, policy(5), &sleeper).unwrap();
    }
}
