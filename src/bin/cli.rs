//! paper-digest CLI
//!
//! One-shot entry point; schedule it externally (cron, systemd timers).

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use paper_digest::{
    config::{CrawlContext, load_config},
    error::Result,
    models::Config,
    pipeline,
};

/// paper-digest - daily arXiv digest
#[derive(Parser, Debug)]
#[command(
    name = "paper-digest",
    version,
    about = "Daily arXiv paper digest"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "storage/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the crawl window that applies now
    Window,

    /// Fetch the current window's papers as JSON
    Crawl {
        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the full digest: crawl → summarize → notify
    Run {
        /// Deliver without AI summaries
        #[arg(long)]
        skip_summary: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Window => {
            let config = load_config(&cli.config)?;
            let context = CrawlContext::from_config(&config)?;
            let window = context.calculator.window_at(Utc::now())?;

            let (start, end) = window.bounds_in(context.calculator.zone());
            println!("{} {} -> {}", context.calculator.zone(), start, end);
            let (start, end) = window.bounds_in(&context.feed_zone);
            println!("{} {} -> {}", context.feed_zone, start, end);
        }

        Command::Crawl { output } => {
            let config = load_config(&cli.config)?;
            let papers = pipeline::run_crawler(&config).await?;
            let json = serde_json::to_string_pretty(&papers)?;

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)?;
                    log::info!("Wrote {} papers to {}", papers.len(), path.display());
                }
                None => println!("{json}"),
            }
        }

        Command::Run { skip_summary } => {
            let config = load_config(&cli.config)?;
            let outcome = pipeline::run_digest(&config, skip_summary).await?;
            log::info!(
                "Digest run finished: {} papers, {} summarized, {} delivered, {} failed",
                outcome.papers,
                outcome.summarized,
                outcome.delivery.delivered,
                outcome.delivery.failed
            );
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            let mut config = Config::load(&cli.config)?;
            config.apply_env();
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            let context = CrawlContext::from_config(&config)?;
            log::info!(
                "✓ Config OK ({} categories via {}, anchors {:?} in {})",
                context.categories.len(),
                context.protocol,
                context.calculator.anchors(),
                context.calculator.zone()
            );
        }
    }

    Ok(())
}
