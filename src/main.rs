//! Kagami main entry point
//!
//! Command-line interface for the Kagami website media mirror.

use clap::Parser;
use kagami::config::load_config_with_hash;
use kagami::crawler::crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kagami: a website media mirror
///
/// Kagami crawls a site from a single seed URL, following links and images
/// that pass the configured filter and the site's robots.txt, and mirrors
/// every image into a local directory. Progress is persisted, so an
/// interrupted crawl picks up where it left off.
#[derive(Parser, Debug)]
#[command(name = "kagami")]
#[command(version = "1.0.0")]
#[command(about = "A website media mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show resource counts from the state database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if cli.dry_run {
        print_dry_run(&config);
    } else if cli.stats {
        print_stats(&config)?;
    } else {
        let summary = crawl(config).await?;
        println!("{}", summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kagami=info,warn"),
            1 => EnvFilter::new("kagami=debug,info"),
            2 => EnvFilter::new("kagami=trace,debug"),
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

/// Validates the config and shows what a crawl would do
fn print_dry_run(config: &kagami::Config) {
    println!("=== Kagami Dry Run ===\n");

    println!("Crawl:");
    println!("  Seed: {}", config.crawl.seed);
    println!("  Page fetchers: {}", config.crawl.page_workers);
    println!("  Image downloaders: {}", config.crawl.image_workers);
    println!("  Harvesters: {}", config.crawl.harvesters);
    println!("  Queue capacity: {}", config.crawl.queue_size);

    println!("\nFilter:");
    match (&config.filter.pattern, config.filter.keywords.is_empty()) {
        (Some(pattern), _) => println!("  Pattern: {}", pattern),
        (None, false) => println!("  Keywords: {}", config.filter.keywords.join(", ")),
        (None, true) => println!("  (none; every discovered address passes)"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Mirror directory: {}", config.output.mirror_dir);
    println!("  State database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Shows resource counts from the state database
fn print_stats(config: &kagami::Config) -> anyhow::Result<()> {
    use kagami::storage::{open_store, Store};
    use std::path::Path;

    let store = open_store(Path::new(&config.output.database_path))?;

    println!("Database: {}\n", config.output.database_path);

    let mut finished = 0u64;
    let mut outstanding = 0u64;
    for (kind, state, count) in store.counts()? {
        println!("  {} {}: {}", kind, state, count);
        if state.is_terminal() {
            finished += count;
        } else {
            outstanding += count;
        }
    }
    println!(
        "\n{} finished, {} outstanding, {} admitted in total",
        finished,
        outstanding,
        store.count_total()?
    );

    Ok(())
}
