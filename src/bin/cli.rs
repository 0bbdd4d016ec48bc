//! Harvester CLI
//!
//! Collects the sources once, writes the document and exits.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use harvester::{
    error::Result,
    models::Config,
    pipeline::{self, RunReport, Summary},
    storage::{DocumentStorage, LocalStorage},
};

/// Exit status for a run interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// UAE university data harvester
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Collects UAE university, course and cost-of-living data into one JSON document"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect all sources and write the document
    Run {
        /// Also collect the ranking portal
        #[arg(long)]
        portal: bool,

        /// Output directory (overrides output.dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,

    /// Show a summary of the last written document
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn log_summary(summary: &Summary) {
    log::info!(
        "Accreditation: {} licensed, {} revoked",
        summary.licensed(),
        summary.revoked()
    );
    for (emirate, count) in &summary.by_emirate {
        log::info!("  {}: {}", emirate, count);
    }
}

fn log_report(report: &RunReport) {
    log::info!("Harvest complete");
    log::info!("  Universities: {}", report.summary.total_universities);
    log::info!("  Courses:      {}", report.summary.total_courses);
    log::info!("  Output:       {}", report.path.display());
    log::info!("  Duration:     {:.1}s", report.duration.as_secs_f64());
    if !report.rejections.is_empty() {
        log::info!("  Rejected:     {}", report.rejections.len());
    }
    if report.warnings > 0 {
        log::info!("  Downgraded:   {} fields", report.warnings);
    }
    if !report.failed_sources.is_empty() {
        log::warn!("  Failed sources: {}", report.failed_sources.join(", "));
    }
    log_summary(&report.summary);
}

/// Load the configuration with command-line overrides applied.
fn load_config(cli: &Cli) -> Config {
    let mut config = Config::load_or_default(&cli.config);
    if let Command::Run { portal, output } = &cli.command {
        if *portal {
            config.sources.portal_enabled = true;
        }
        if let Some(dir) = output {
            config.output.dir = dir.clone();
        }
    }
    config
}

async fn execute(command: Command, config: Config) -> Result<()> {
    match command {
        Command::Run { .. } => {
            let report = pipeline::run(config).await?;
            log_report(&report);
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            config.validate()?;
            log::info!("✓ Config OK");
            log::info!("  Registry: {}", config.sources.caa_institutions);
            log::info!(
                "  Portal:   {} ({})",
                config.sources.portal_universities,
                if config.sources.portal_enabled { "enabled" } else { "disabled" }
            );
            log::info!("  Living:   {}", config.sources.living_cost);
            log::info!(
                "  Output:   {}",
                config.output.dir.join(&config.output.file_name).display()
            );
        }

        Command::Info => {
            let storage = LocalStorage::from_config(&config.output);
            match storage.load_document().await? {
                Some(document) => {
                    log::info!("Document: {}", storage.path().display());
                    log::info!("Scraped at: {}", document.metadata.scraped_at);
                    log::info!("Universities: {}", document.universities.len());
                    log::info!("Courses: {}", document.courses.len());
                    log_summary(&Summary::of(&document));
                }
                None => log::info!("No document found at {}", storage.path().display()),
            }
        }
    }

    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli);
    let storage = LocalStorage::from_config(&config.output);

    tokio::select! {
        result = execute(cli.command, config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("Harvest failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            match storage.discard_partial().await {
                Ok(true) => log::debug!("Removed partial write next to {}", storage.path().display()),
                Ok(false) => {}
                Err(e) => log::warn!("Could not remove partial write: {}", e),
            }
            log::warn!("Interrupted, no document written");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}
