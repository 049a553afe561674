use std::{
    io::IsTerminal,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tracing::{debug, info, warn};

use crate::result::Result;

/// Something told when a long-running operation starts and ends
pub trait ProgressReporter: Sync {
    fn begin(&self, task: &str);

    fn end(&self, task: &str, success: bool);
}

/// Run `f` as the long-running operation `task`
pub fn with_progress<T, F>(reporter: &dyn ProgressReporter, task: &str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    reporter.begin(task);
    let res = f();
    reporter.end(task, res.is_ok());
    res
}

/// Pick the spinner when stderr is a terminal, plain logs otherwise
pub fn for_stderr() -> Box<dyn ProgressReporter> {
    if std::io::stderr().is_terminal() {
        Box::new(Spinner::new())
    } else {
        Box::new(LogProgress)
    }
}

/// Report operations as log lines
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn begin(&self, task: &str) {
        info!("{task}...");
    }

    fn end(&self, task: &str, success: bool) {
        if success {
            debug!("{task}: done");
        } else {
            warn!("{task}: failed");
        }
    }
}

const TICK: Duration = Duration::from_millis(100);

/// Animated spinner drawn on stderr while a task runs
#[derive(Default)]
pub struct Spinner {
    bar: Mutex<Option<ProgressBar>>,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressReporter for Spinner {
    fn begin(&self, task: &str) {
        debug!("{task}");
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(task.to_owned());
        bar.enable_steady_tick(TICK);

        if let Some(previous) = self.slot().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn end(&self, task: &str, success: bool) {
        let Some(bar) = self.slot().take() else {
            return;
        };
        let mark = if success {
            "✔".green().to_string()
        } else {
            "✘".red().to_string()
        };
        bar.set_style(
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.finish_with_message(format!("{mark} {task}"));
    }
}
