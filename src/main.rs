//! # Asset-mirror CLI
//!
//! Command-line interface for the asset-mirror library.
//! Scans the seed pages and mirrors every linked asset into a local directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use asset_mirror::{
    Downloader, LinkPlan, Mirror, MirrorConfig, MirrorOptions, MirrorReport, DEFAULT_AUDIT_FILE,
    DEFAULT_OUTPUT_DIR, DEFAULT_SEEDS,
};
use clap::Parser;
use log::error;

mod cli;

/// Command-line interface for asset-mirror
#[derive(Parser)]
#[command(name = "asset-mirror")]
#[command(about = "Mirror the downloadable assets linked from a set of web pages")]
#[command(long_about = "Scans seed pages for links to documents, images, archives and data files,
and downloads each one into the output directory exactly once:
  asset-mirror                                  # Mirror the built-in seed pages into Assets/
  asset-mirror --seed https://example.com/docs/ # Mirror a different page
  asset-mirror --dry-run                        # List what would be downloaded

Files already present in the output directory are never fetched or overwritten.")]
#[command(version)]
struct Cli {
    /// Seed page to scan (repeatable); defaults to the built-in list
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Directory downloaded assets are written to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// File the raw seed page bodies are appended to
    #[arg(long, default_value = DEFAULT_AUDIT_FILE)]
    audit_file: PathBuf,

    /// Do not append page bodies to the audit file
    #[arg(long)]
    no_audit: bool,

    /// Timeout in seconds for each asset download
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Timeout in seconds for each seed page fetch (no limit by default)
    #[arg(long)]
    page_timeout: Option<u64>,

    /// Number of downloads in flight
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    /// Write the run report as JSON to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Fetch and scan the seed pages, but download and write nothing
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Build the run configuration from the parsed arguments
    fn to_config(&self) -> MirrorConfig {
        let seeds = if self.seeds.is_empty() {
            DEFAULT_SEEDS.iter().map(|s| s.to_string()).collect()
        } else {
            self.seeds.clone()
        };

        MirrorConfig {
            seeds,
            output_dir: self.output_dir.clone(),
            audit_file: (!self.no_audit).then(|| self.audit_file.clone()),
            download_timeout: Duration::from_secs(self.timeout),
            page_timeout: self.page_timeout.map(Duration::from_secs),
            jobs: self.jobs.max(1),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🪞 Asset-mirror v{} starting...", env!("CARGO_PKG_VERSION"));
    }

    let config = cli.to_config();
    let mirror = Mirror::new(config).context("failed to set up HTTP client")?;

    if cli.dry_run {
        let plan = mirror.plan().await;
        show_plan(&plan, mirror.config());
        return Ok(());
    }

    let progress_manager = cli::ProgressManager::new(0, "🌐 Mirroring linked assets");
    let options = MirrorOptions {
        progress: Some(Arc::new({
            let progress_manager = progress_manager.clone();
            move |done: u64, total: u64| progress_manager.update(done, total)
        })),
    };

    let report = mirror.run(&options).await;
    progress_manager.pb.finish_and_clear();

    show_summary(&report);

    if let Some(path) = &cli.report {
        write_report(&report, path)?;
        eprintln!("📝 Report written to {}", path.display());
    }

    Ok(())
}

/// Print the links a real run would resolve
fn show_plan(plan: &LinkPlan, config: &MirrorConfig) {
    for page in &plan.pages {
        if let Some(err) = &page.error {
            eprintln!("⚠️  [DRY RUN] Could not fetch {}: {err}", page.url);
        }
    }

    for link in &plan.invalid_links {
        eprintln!("⚠️  [DRY RUN] Invalid URL, would skip: {link}");
    }

    for link in &plan.links {
        match Downloader::target_path(link, &config.output_dir) {
            Ok(target) => {
                let state = if target.is_file() { "exists" } else { "new" };
                eprintln!("🔍 [DRY RUN] {link} → {} ({state})", target.display());
            }
            Err(err) => eprintln!("⚠️  [DRY RUN] {link}: {err}"),
        }
    }

    eprintln!(
        "🔍 [DRY RUN] {} links found, {} unique, {} downloadable",
        plan.extracted,
        plan.unique,
        plan.links.len()
    );
}

/// Print the per-run totals
fn show_summary(report: &MirrorReport) {
    eprintln!(
        "✅ {} downloaded ({} bytes), {} skipped, {} failed, {} invalid, {} of {} pages unreachable",
        report.downloaded(),
        report.bytes_written(),
        report.skipped(),
        report.failed(),
        report.invalid_links.len(),
        report.failed_pages(),
        report.pages.len()
    );
}

/// Save the run report as pretty-printed JSON
fn write_report(report: &MirrorReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))
}
