//! Stoker main entry point
//!
//! Command-line interface for the cache pre-warming crawler. Every
//! subcommand maps to one operation on the driver; cron jobs call the same
//! `crawl` entry the admin does.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use stoker::config::load_config;
use stoker::output::{render_profiles, render_status};
use stoker::Driver;
use tracing_subscriber::EnvFilter;

/// Stoker: a site cache pre-warming crawler
///
/// Walks the site's URL set under each configured client identity (roles,
/// WebP, mobile, cookie variants) in bounded passes, so variant-specific
/// cache entries are warm before real visitors arrive.
#[derive(Parser, Debug)]
#[command(name = "stoker")]
#[command(version)]
#[command(about = "A site cache pre-warming crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "stoker.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one bounded crawl pass
    Crawl {
        /// Ignore the whole-cycle interval and crawl now
        #[arg(long)]
        force: bool,
    },

    /// Generate the sitemap snapshot
    Sitemap,

    /// Reset the crawl position to the start of the snapshot
    ResetPos,

    /// Show the crawler's persisted state
    Status,

    /// List the enumerated crawler profiles
    Crawlers {
        /// Print only the profile count
        #[arg(long)]
        count: bool,
    },

    /// Inspect or edit the URL blacklist
    Blacklist {
        #[command(subcommand)]
        command: BlacklistCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BlacklistCommand {
    /// Print the blacklist
    Show,

    /// Print the blacklist entry count
    Count,

    /// Replace the blacklist with the contents of a file ("-" reads stdin)
    Save { file: PathBuf },

    /// Append URLs to the blacklist
    Add { urls: Vec<String> },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::debug!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    let driver = Driver::new(config);

    match cli.command {
        Commands::Crawl { force } => handle_crawl(&driver, force).await?,
        Commands::Sitemap => {
            let count = driver.generate_sitemap().await?;
            println!("Sitemap generated with {} URL(s).", count);
        }
        Commands::ResetPos => {
            driver.reset_pos()?;
            println!("Crawl position reset.");
        }
        Commands::Status => {
            let report = driver.status()?;
            print!("{}", render_status(&report));
        }
        Commands::Crawlers { count } => {
            let profiles = driver.list_crawlers();
            if count {
                println!("{}", profiles.len());
            } else {
                print!("{}", render_profiles(&profiles));
            }
        }
        Commands::Blacklist { command } => handle_blacklist(&driver, command)?,
    }

    Ok(())
}

/// Runs one crawl pass, treating refused/locked runs as ordinary outcomes
async fn handle_crawl(driver: &Driver, force: bool) -> anyhow::Result<()> {
    match driver.crawl(force).await {
        Ok(summary) => {
            println!("{}", summary);
            Ok(())
        }
        Err(e) if e.is_benign() => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_blacklist(driver: &Driver, command: BlacklistCommand) -> anyhow::Result<()> {
    match command {
        BlacklistCommand::Show => {
            let content = driver.get_blacklist()?;
            if content.is_empty() {
                println!("(blacklist is empty)");
            } else {
                println!("{}", content);
            }
        }
        BlacklistCommand::Count => {
            println!("{}", driver.count_blacklist());
        }
        BlacklistCommand::Save { file } => {
            let raw = if file.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("failed to read {}", file.display()))?
            };
            let count = driver.save_blacklist(&raw)?;
            println!("Blacklist saved with {} URL(s).", count);
        }
        BlacklistCommand::Add { urls } => {
            let count = driver.append_blacklist(&urls)?;
            println!("Blacklist now holds {} URL(s).", count);
        }
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stoker=info,warn"),
            1 => EnvFilter::new("stoker=debug,info"),
            2 => EnvFilter::new("stoker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
