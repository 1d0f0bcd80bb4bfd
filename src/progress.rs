//! Build progress reporting.
//!
//! Each sort listing gets its own bar; committing the catalog shows a spinner.
//! In log-only mode the bars are hidden and progress is reported as periodic
//! `tracing` lines instead, which reads better in a tailed log.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

/// Global flag for log-only mode (set from args in main)
pub static LOG_ONLY: AtomicBool = AtomicBool::new(false);

const BAR_TEMPLATE: &str =
    "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} charts ({per_sec}, ETA: {eta})";
const SPINNER_TEMPLATE: &str = "{msg} {spinner} [{elapsed_precise}]";

/// Charts between two log-only progress lines.
const LOG_EVERY: u64 = 50;

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

pub fn is_log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Format duration in human-readable format
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

fn styled(pb: ProgressBar, template: &str) -> ProgressBar {
    match ProgressStyle::default_bar().template(template) {
        Ok(style) if !is_log_only() => pb.set_style(style.progress_chars("=> ")),
        _ => pb.set_draw_target(ProgressDrawTarget::hidden()),
    }
    pb
}

/// Progress over the charts of one sort listing.
pub struct ListingProgress {
    bar: ProgressBar,
    listing: String,
    total: u64,
    done: u64,
}

impl ListingProgress {
    pub fn new(listing: &str, total: u64) -> Self {
        let bar = styled(ProgressBar::new(total), BAR_TEMPLATE);
        bar.set_message(listing.to_string());
        Self {
            bar,
            listing: listing.to_string(),
            total,
            done: 0,
        }
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    /// Count one finished chart.
    pub fn advance(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        if self.should_log() {
            let pct = 100.0 * self.done as f64 / self.total as f64;
            info!("[{}] {}/{} charts ({:.1}%)", self.listing, self.done, self.total, pct);
        }
    }

    fn should_log(&self) -> bool {
        is_log_only() && self.total > 0 && (self.done % LOG_EVERY == 0 || self.done == self.total)
    }

    pub fn finish(self) {
        self.bar
            .finish_with_message(format!("{}: {} charts", self.listing, self.done));
    }

    /// Leave the bar where the build stopped.
    pub fn abandon(self) {
        self.bar
            .abandon_with_message(format!("{}: stopped after {} charts", self.listing, self.done));
    }
}

/// Spinner shown while the catalog is written and swapped in.
pub fn commit_spinner(songs: usize) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        Ok(style) if !is_log_only() => {
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        _ => pb.set_draw_target(ProgressDrawTarget::hidden()),
    }
    pb.set_message(format!("Committing {} songs", songs));
    pb
}
