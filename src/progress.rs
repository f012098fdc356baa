//! Progress indicators for oradm CLI.

use colored::Colorize;
use declarative::{ProgressCallback, ReconciliationResult};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ui;

/// Create a spinner with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Create a progress bar over `len` requests
pub fn bar(len: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb.set_prefix(msg.to_string());
    pb
}

/// Symbol for one reconciliation result
pub fn symbol(result: &ReconciliationResult) -> colored::ColoredString {
    if !result.is_success() {
        "✗".red()
    } else if result.changed {
        "✓".green()
    } else {
        "○".dimmed()
    }
}

/// Batch progress: a bar while requests run, one line per finished request.
pub struct BatchProgress {
    title: String,
    bar: Option<ProgressBar>,
}

impl BatchProgress {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            bar: None,
        }
    }

    fn line(label: &str, result: &ReconciliationResult) -> String {
        format!(
            "  {} {:<30} {}",
            symbol(result),
            ui::truncate_path(label, 30),
            result.message.dimmed()
        )
    }
}

impl ProgressCallback for BatchProgress {
    fn on_batch_start(&mut self, count: usize) {
        self.bar = Some(bar(count as u64, &self.title));
    }

    fn on_resource_start(&mut self, label: &str) {
        if let Some(pb) = &self.bar {
            pb.set_message(label.to_string());
        }
    }

    fn on_resource_complete(&mut self, label: &str, result: &ReconciliationResult) {
        match &self.bar {
            Some(pb) => {
                pb.println(Self::line(label, result));
                pb.inc(1);
            }
            None => println!("{}", Self::line(label, result)),
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.finish_and_clear();
        }
    }
}
