//! CLI-specific progress handling for asset-mirror
//!
//! Provides the progress bar shown while assets are resolved.

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting processed assets
pub fn create_progress_bar(total_assets: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_assets);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} assets ({percent}%) ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    );
    pb
}

/// Progress manager for a mirror run
#[derive(Clone)]
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_assets: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_assets);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Move the bar to `done` out of `total`, finishing it at the end
    pub fn update(&self, done: u64, total: u64) {
        if self.pb.length().unwrap_or(0) != total {
            self.pb.set_length(total);
        }
        self.pb.set_position(done);
        if done >= total {
            self.pb.finish_with_message("done");
        }
    }
}
