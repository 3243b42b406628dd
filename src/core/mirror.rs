//! Mirror run orchestration
//!
//! Sequences seed fetch, audit append, link extraction, deduplication,
//! validation and per-asset download. Every step records its per-item
//! results; nothing short of a panic stops the run early.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::core::config::{MirrorConfig, MirrorOptions};
use crate::core::downloader::{DownloadOutcome, Downloader};
use crate::core::error::{serialize_opt_error, Error, Result};
use crate::core::extract::{dedup_links, extract_asset_links, is_valid_url};
use crate::core::fetch::PageFetcher;

/// Result of fetching one seed page
#[derive(Debug, Serialize)]
pub struct PageReport {
    pub url: String,

    /// Body length in bytes when the fetch succeeded
    pub bytes: Option<usize>,

    #[serde(serialize_with = "serialize_opt_error")]
    pub error: Option<Error>,
}

/// Result of resolving one asset link
#[derive(Debug, Serialize)]
pub struct AssetReport {
    pub url: String,

    /// Local file the asset maps to, if a filename could be derived
    pub path: Option<PathBuf>,

    pub outcome: DownloadOutcome,
}

/// Links found on the seed pages, before any download
#[derive(Debug, Serialize)]
pub struct LinkPlan {
    pub pages: Vec<PageReport>,

    /// Number of raw matches, duplicates included
    pub extracted: usize,

    /// Number of distinct links
    pub unique: usize,

    /// Distinct links that are not absolute URLs
    pub invalid_links: Vec<String>,

    /// Distinct valid links, in order of first appearance
    pub links: Vec<String>,

    #[serde(skip)]
    corpus: String,
}

/// Outcome of a whole mirror run
#[derive(Debug, Serialize)]
pub struct MirrorReport {
    pub pages: Vec<PageReport>,
    pub extracted: usize,
    pub unique: usize,
    pub invalid_links: Vec<String>,
    pub assets: Vec<AssetReport>,
}

impl MirrorReport {
    /// Number of assets written during this run
    pub fn downloaded(&self) -> usize {
        self.assets.iter().filter(|a| a.outcome.is_success()).count()
    }

    /// Number of assets already present
    pub fn skipped(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| matches!(a.outcome, DownloadOutcome::Skipped))
            .count()
    }

    /// Number of assets that failed
    pub fn failed(&self) -> usize {
        self.assets
            .iter()
            .filter(|a| matches!(a.outcome, DownloadOutcome::Failed(_)))
            .count()
    }

    /// Number of seed pages that could not be fetched
    pub fn failed_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.error.is_some()).count()
    }

    /// Total bytes written during this run
    pub fn bytes_written(&self) -> u64 {
        self.assets
            .iter()
            .map(|a| match a.outcome {
                DownloadOutcome::Success(n) => n,
                _ => 0,
            })
            .sum()
    }
}

/// Append the newline-joined page bodies, plus a trailing newline, to the audit file
async fn append_audit(path: &Path, corpus: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    file.write_all(corpus.as_bytes()).await?;
    file.write_all(b"\n").await?;
    file.flush().await
}

/// Create the output directory if it is missing
async fn ensure_output_dir(path: &Path) -> std::io::Result<()> {
    if tokio::fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Ok(());
    }

    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder.create(path).await
}

/// Runs the mirror pipeline for one configuration
pub struct Mirror {
    config: MirrorConfig,
    fetcher: PageFetcher,
    downloader: Downloader,
}

impl Mirror {
    /// Create a mirror with HTTP clients built from `config`
    pub fn new(config: MirrorConfig) -> Result<Self> {
        let fetcher = PageFetcher::new(config.page_timeout)?;
        let downloader = Downloader::new(config.download_timeout)?;
        Ok(Self {
            config,
            fetcher,
            downloader,
        })
    }

    /// The configuration this mirror runs with
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Fetch the seed pages and work out which links would be downloaded
    ///
    /// Touches nothing on disk.
    pub async fn plan(&self) -> LinkPlan {
        let mut pages = Vec::with_capacity(self.config.seeds.len());
        let mut bodies = Vec::new();
        let mut extracted = Vec::new();

        for seed in &self.config.seeds {
            match self.fetcher.fetch_page(seed).await {
                Ok(body) => {
                    debug!("Fetched {} bytes from {seed}", body.len());
                    pages.push(PageReport {
                        url: seed.clone(),
                        bytes: Some(body.len()),
                        error: None,
                    });
                    // Links never span two pages
                    extracted.extend(extract_asset_links(&body));
                    bodies.push(body);
                }
                Err(e) => {
                    error!("Failed to fetch seed page {seed}: {e}");
                    pages.push(PageReport {
                        url: seed.clone(),
                        bytes: None,
                        error: Some(e),
                    });
                }
            }
        }

        let corpus = bodies.join("\n");
        let extracted_count = extracted.len();
        let unique = dedup_links(extracted);
        let unique_count = unique.len();

        let (links, invalid_links): (Vec<String>, Vec<String>) =
            unique.into_iter().partition(|link| is_valid_url(link));
        for link in &invalid_links {
            warn!("Skipping invalid URL: {link}");
        }

        info!(
            "Found {extracted_count} asset links, {unique_count} unique, {} downloadable",
            links.len()
        );

        LinkPlan {
            pages,
            extracted: extracted_count,
            unique: unique_count,
            invalid_links,
            links,
            corpus,
        }
    }

    /// Run the whole pipeline and report every per-item result
    pub async fn run(&self, options: &MirrorOptions) -> MirrorReport {
        let plan = self.plan().await;

        if let Some(audit_file) = &self.config.audit_file {
            if let Err(e) = append_audit(audit_file, &plan.corpus).await {
                error!("Failed to append to audit file {}: {e}", audit_file.display());
            }
        }

        let output_dir = self.config.output_dir.as_path();
        if let Err(e) = ensure_output_dir(output_dir).await {
            error!("Failed to create output directory {}: {e}", output_dir.display());
        }

        let assets = self.download_all(&plan.links, output_dir, options).await;

        let report = MirrorReport {
            pages: plan.pages,
            extracted: plan.extracted,
            unique: plan.unique,
            invalid_links: plan.invalid_links,
            assets,
        };

        info!(
            "Mirror finished: {} downloaded ({} bytes), {} skipped, {} failed",
            report.downloaded(),
            report.bytes_written(),
            report.skipped(),
            report.failed()
        );

        report
    }

    /// Resolve every link with at most `jobs` downloads in flight
    ///
    /// Reports come back in the order of `links`.
    async fn download_all(
        &self,
        links: &[String],
        output_dir: &Path,
        options: &MirrorOptions,
    ) -> Vec<AssetReport> {
        let total = links.len() as u64;
        let mut completed = 0u64;
        let jobs = self.config.jobs.max(1);

        futures::stream::iter(links)
            .map(|url| async move {
                let outcome = self.downloader.resolve(url, output_dir).await;
                AssetReport {
                    url: url.clone(),
                    path: Downloader::target_path(url, output_dir).ok(),
                    outcome,
                }
            })
            .buffered(jobs)
            .inspect(|_| {
                completed += 1;
                if let Some(progress) = &options.progress {
                    progress(completed, total);
                }
            })
            .collect()
            .await
    }
}
