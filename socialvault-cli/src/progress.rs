use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use socialvault_core::backup::observer::StepObserver;
use socialvault_core::backup::step::{BackupStep, StepId, StepStatus};

/// Renders workflow transitions as a single progress bar over the five steps.
pub struct StepProgress {
    bar: ProgressBar,
}

impl StepProgress {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(StepId::ALL.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| format!("progress bar template error: {e}"))?
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl StepObserver for StepProgress {
    fn on_transition(&self, step: &BackupStep) {
        let detail = step.message.as_deref().unwrap_or("");
        match step.status {
            StepStatus::InProgress => {
                self.bar.set_message(format!("{}: {}", step.title, detail));
            }
            StepStatus::Completed => {
                self.bar.println(format!("  [ok]   {:<22} {}", step.title, detail));
                self.bar.inc(1);
            }
            StepStatus::Failed => {
                self.bar.println(format!("  [fail] {:<22} {}", step.title, detail));
            }
            StepStatus::Pending => {}
        }
    }
}
