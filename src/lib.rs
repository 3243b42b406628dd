//! # Asset-mirror Library
//!
//! Keeps a local mirror of the downloadable assets (documents, images,
//! archives, data files) linked from a fixed set of web pages.
//!
//! ## Features
//!
//! - **Pattern-based extraction**: finds `href="..."` links with known asset extensions
//! - **Deterministic filenames**: every URL maps to one lowercase, filesystem-safe name
//! - **Idempotent downloads**: files already present are never fetched or overwritten again
//! - **Structured reports**: every page and asset outcome is returned to the caller
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = asset_mirror::mirror(asset_mirror::MirrorConfig::default()).await?;
//!     println!(
//!         "{} downloaded, {} skipped, {} failed",
//!         report.downloaded(),
//!         report.skipped(),
//!         report.failed()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Single Asset
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = asset_mirror::Downloader::new(Duration::from_secs(60))?;
//!     let outcome = downloader
//!         .resolve("https://example.com/files/sheet.pdf", Path::new("Assets"))
//!         .await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

// Re-export core types that users might need
pub use crate::core::config::{
    MirrorConfig, MirrorOptions, ProgressCallback, DEFAULT_AUDIT_FILE, DEFAULT_DOWNLOAD_TIMEOUT,
    DEFAULT_OUTPUT_DIR, DEFAULT_SEEDS,
};
pub use crate::core::downloader::{DownloadOutcome, Downloader};
pub use crate::core::error::{Error, Result};
pub use crate::core::extract::{dedup_links, extract_asset_links, is_valid_url, ASSET_EXTENSIONS};
pub use crate::core::fetch::{PageFetcher, USER_AGENT};
pub use crate::core::mirror::{AssetReport, LinkPlan, Mirror, MirrorReport, PageReport};
pub use crate::core::sanitize::{extension_of, sanitize_filename};

// Internal modules
mod core;

/// Run a complete mirror pass
///
/// Fetches every seed page, downloads each new asset into the output
/// directory and returns the per-item outcomes. Only client construction can
/// fail; per-page and per-asset failures are part of the report.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = asset_mirror::MirrorConfig {
///     seeds: vec!["https://example.com/downloads/".to_string()],
///     ..Default::default()
/// };
/// let report = asset_mirror::mirror(config).await?;
/// assert_eq!(report.pages.len(), 1);
/// # Ok(())
/// # }
/// ```
pub async fn mirror(config: MirrorConfig) -> Result<MirrorReport> {
    mirror_with_options(config, MirrorOptions::default()).await
}

/// Run a complete mirror pass with progress reporting
///
/// The callback receives (assets processed, assets total) after each asset.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// asset_mirror::mirror_with_progress(
///     asset_mirror::MirrorConfig::default(),
///     |done, total| println!("Progress: {done}/{total} assets"),
/// ).await?;
/// # Ok(())
/// # }
/// ```
pub async fn mirror_with_progress<F>(config: MirrorConfig, progress: F) -> Result<MirrorReport>
where
    F: Fn(u64, u64) + Send + Sync + 'static,
{
    let options = MirrorOptions {
        progress: Some(std::sync::Arc::new(progress)),
    };
    mirror_with_options(config, options).await
}

/// Run a complete mirror pass with custom options
pub async fn mirror_with_options(config: MirrorConfig, options: MirrorOptions) -> Result<MirrorReport> {
    let mirror = Mirror::new(config)?;
    Ok(mirror.run(&options).await)
}
