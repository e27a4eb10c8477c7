//! Progress bar shown while converting a directory.
//!
//! Per-file log lines are printed through [`ConvertProgress::suspend`] so they
//! land above the bar instead of tearing it.

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "[{wide_bar}] {pos}/{len} files converted ({percent}%)";

pub struct ConvertProgress {
    multi: MultiProgress,
    bar: ProgressBar,
}

impl ConvertProgress {
    /// A bar over `total` files, drawn on stderr when it is a terminal.
    pub fn new(total: usize) -> Result<Self> {
        Self::with_draw_target(total, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(total: usize, target: ProgressDrawTarget) -> Result<Self> {
        let multi = MultiProgress::with_draw_target(target);
        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(ProgressStyle::with_template(TEMPLATE)?.progress_chars("=>-"));
        Ok(Self { multi, bar })
    }

    /// Run `f` with the bar hidden, for output that must not interleave with it.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.multi.suspend(f)
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
