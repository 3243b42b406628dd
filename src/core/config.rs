//! Run configuration for asset-mirror
//!
//! Holds the seed pages, output locations and network limits for one mirror run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Seed pages scraped when no other list is given
pub const DEFAULT_SEEDS: &[&str] = &[
    "https://kandelandson.com/wp/sds-sheets/",
    "https://kandelandson.com/wp/green-cleaning/",
    "https://kandelandson.com/wp/elite-dispensing-systems/",
    "https://kandelandson.com/wp/mj98-plus/",
    "https://kandelandson.com/wp/campro/",
    "https://kandelandson.com/wp/mpc-cleaning-products/",
    "https://kandelandson.com/wp/majestic-carpet-solutions/",
];

/// Directory that receives downloaded assets
pub const DEFAULT_OUTPUT_DIR: &str = "Assets";

/// File the raw seed page bodies are appended to
pub const DEFAULT_AUDIT_FILE: &str = "kandelandson.html";

/// Upper bound on one asset request/response cycle
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a mirror run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Pages scanned for asset links
    pub seeds: Vec<String>,

    /// Directory assets are written into
    pub output_dir: PathBuf,

    /// Append-only copy of the fetched page bodies, `None` to skip it
    pub audit_file: Option<PathBuf>,

    /// Timeout for each asset download
    pub download_timeout: Duration,

    /// Timeout for each seed page fetch, `None` for no limit
    pub page_timeout: Option<Duration>,

    /// Maximum number of downloads in flight
    pub jobs: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            seeds: DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            audit_file: Some(PathBuf::from(DEFAULT_AUDIT_FILE)),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            page_timeout: None,
            jobs: 1,
        }
    }
}

/// Progress callback function type, receives (assets processed, assets total)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Per-run options that are not part of the configuration proper
#[derive(Default)]
pub struct MirrorOptions {
    /// Optional progress callback, invoked after each asset
    pub progress: Option<ProgressCallback>,
}
