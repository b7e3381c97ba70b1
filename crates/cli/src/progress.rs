//! Two-line operator readout: a workers line and a completion bar.

use std::sync::{Arc, Mutex};

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use leadsub_core::{ProgressCallback, RunProgress};

const BAR_TEMPLATE: &str = "{msg} [{bar:60}] {pos}/{len} ({percent}%)";

pub struct ProgressReadout {
    multi: MultiProgress,
    workers: ProgressBar,
    bar: ProgressBar,
    /// Lines printed above the bars.
    notices: Arc<Mutex<Vec<String>>>,
}

impl ProgressReadout {
    /// Readout drawn to stderr for `total` identifiers of `title`.
    pub fn new(title: &str, total: usize) -> Self {
        Self::with_target(title, total, ProgressDrawTarget::stderr())
    }

    /// Readout that tracks state without drawing anything.
    pub fn hidden(title: &str, total: usize) -> Self {
        Self::with_target(title, total, ProgressDrawTarget::hidden())
    }

    fn with_target(title: &str, total: usize, target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);

        let workers = multi.add(ProgressBar::new_spinner());
        workers.set_style(
            ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        workers.set_message(format!("prepping workers for {}", title));

        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_message("progress");

        Self {
            multi,
            workers,
            bar,
            notices: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Callback that feeds orchestrator events into the readout.
    pub fn callback(&self, title: &str) -> ProgressCallback {
        let workers = self.workers.clone();
        let bar = self.bar.clone();
        let multi = self.multi.clone();
        let notices = Arc::clone(&self.notices);
        let title = title.to_string();

        Arc::new(move |event: RunProgress| match event {
            RunProgress::Spawned {
                index,
                total,
                lead_id,
                via_call,
            } => {
                let mut line = format!("prepping workers for {}: {}/{}", title, index + 1, total);
                if via_call {
                    line.push_str(&format!(" | adding data for call: {}", lead_id));
                }
                workers.set_message(line);
            }
            RunProgress::Partial { lead_id, message } => {
                print_above(
                    &multi,
                    &notices,
                    format!("request failed for lead {}: {}", lead_id, message),
                );
            }
            RunProgress::Completed { processed, .. } => {
                bar.set_position(processed as u64);
            }
        })
    }

    /// Completed identifiers shown on the bar.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current workers line.
    pub fn workers_line(&self) -> String {
        self.workers.message()
    }

    /// Leave both lines on screen in their final state.
    pub fn finish(&self) {
        self.workers.finish();
        self.bar.finish();
    }

    /// Lines printed above the readout so far.
    pub fn notices(&self) -> Vec<String> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }
}

/// Print a line above the bars without tearing them.
fn print_above(multi: &MultiProgress, notices: &Mutex<Vec<String>>, line: String) {
    if multi.println(&line).is_err() {
        eprintln!("{}", line);
    }
    if let Ok(mut notices) = notices.lock() {
        notices.push(line);
    }
}
