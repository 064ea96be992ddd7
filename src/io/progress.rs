//! Multi-target progress tracking with automatic batching for large sets

use crate::algorithm::executor::Stage;
use crate::io::configuration::MAX_INDIVIDUAL_PROGRESS_BARS;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Coordinates progress display for batch operations
///
/// Automatically switches between individual progress bars (for small batches)
/// and a single batch progress bar (for large batches) based on target count.
/// Each target bar advances through the job stages; long parallel loops get a
/// transient task bar underneath.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    target_bars: Vec<ProgressBar>,
    target_count: usize,
    /// Stores (`filename`, `completed_stages`, `stage_label`) for rolling window display
    target_states: Vec<(String, usize, &'static str)>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static PROGRESS_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("{msg} [{bar:30.cyan/blue}] {prefix}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Targets: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

static TASK_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("  {msg:>14} [{bar:30.green/white}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            target_bars: Vec::new(),
            target_count: 0,
            target_states: Vec::new(),
        }
    }

    /// Initialize progress bars based on target count
    pub fn initialize(&mut self, target_count: usize) {
        self.target_count = target_count;

        // Switch to batch mode for large target sets to avoid terminal spam
        if target_count > MAX_INDIVIDUAL_PROGRESS_BARS + 1 {
            let batch_bar = ProgressBar::new(target_count as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
        }

        let bars_to_create = target_count.min(MAX_INDIVIDUAL_PROGRESS_BARS);
        for _ in 0..bars_to_create {
            let pb = ProgressBar::new(0);
            pb.set_style(PROGRESS_STYLE.clone());
            self.target_bars.push(self.multi_progress.add(pb));
        }
    }

    /// Number of targets announced in [`Self::initialize`]
    pub const fn target_count(&self) -> usize {
        self.target_count
    }

    /// Configure progress bar for a new target
    pub fn start_target(&mut self, index: usize, path: &Path) {
        let display_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if index >= self.target_states.len() {
            self.target_states.resize(index + 1, (String::new(), 0, ""));
        }
        if let Some(state) = self.target_states.get_mut(index) {
            *state = (display_name, 0, "queued");
        }
        self.update_bars();
    }

    /// Report that target `index` entered `stage`
    pub fn advance(&mut self, index: usize, stage: Stage) {
        if let Some(state) = self.target_states.get_mut(index) {
            state.1 = stage.number() - 1;
            state.2 = stage.label();
        }
        self.update_bars();
    }

    /// Mark target as completed and update batch progress
    pub fn complete_target(&mut self, index: usize, elapsed: Duration) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.inc(1);
        }

        if let Some(state) = self.target_states.get_mut(index) {
            state.0 = format!("✓ {} ({:.1?})", state.0, elapsed);
            state.1 = Stage::COUNT;
            state.2 = "done";
        }
        self.update_bars();
    }

    /// Transient bar for a parallel loop of `len` steps
    ///
    /// The caller finishes it with `finish_and_clear` when the loop is done.
    pub fn task_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        let bar = self.multi_progress.add(ProgressBar::new(len));
        bar.set_style(TASK_STYLE.clone());
        bar.set_message(message);
        bar
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref batch_bar) = self.batch_bar {
            batch_bar.finish_with_message("All targets processed");
        }
        let _ = self.multi_progress.clear();
    }

    /// Update all progress bars to show the last N active targets
    fn update_bars(&self) {
        let active_targets: Vec<&(String, usize, &'static str)> = self
            .target_states
            .iter()
            .filter(|(name, _, _)| !name.is_empty())
            .collect();

        // Take the last N targets
        let start_idx = active_targets
            .len()
            .saturating_sub(MAX_INDIVIDUAL_PROGRESS_BARS);
        let visible_targets = active_targets.get(start_idx..).unwrap_or(&[]);

        for (bar_idx, (name, completed, label)) in visible_targets.iter().enumerate() {
            if let Some(bar) = self.target_bars.get(bar_idx) {
                bar.set_length(Stage::COUNT as u64);
                bar.set_position(*completed as u64);
                bar.set_message(format!("{label:>8} {completed}/{}", Stage::COUNT));
                bar.set_prefix(name.clone());
            }
        }

        // Clear any unused bars
        for bar_idx in visible_targets.len()..self.target_bars.len() {
            if let Some(bar) = self.target_bars.get(bar_idx) {
                bar.set_length(0);
                bar.set_position(0);
                bar.set_message(String::new());
                bar.set_prefix(String::new());
            }
        }
    }
}
