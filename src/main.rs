use anyhow::Context;
use clap::Parser;
use site_mirror::{config, report, run_clone, CloneMode, RunConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "site-mirror",
    version,
    about = "Clone a WordPress site into a browsable offline copy"
)]
struct Args {
    /// Target site URL (e.g. https://example.com)
    url: Option<String>,

    /// Load run settings from a TOML file instead of flags
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL discovery mode
    #[arg(short, long, value_enum, default_value_t = CloneMode::FullCrawl)]
    mode: CloneMode,

    /// Maximum number of pages to download
    #[arg(long, default_value_t = 50)]
    max_pages: usize,

    /// Maximum crawl depth (1-10)
    #[arg(long, default_value_t = 2)]
    depth: u32,

    /// Delay between requests in milliseconds
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Output directory (default: cloned_<host>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma-separated URLs for custom-urls mode
    #[arg(long)]
    urls: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output
    #[arg(short, long)]
    quiet: bool,
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let default_level = match verbose {
        0 => "site_mirror=info",
        1 => "site_mirror=debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_config(args: &Args) -> anyhow::Result<RunConfig> {
    if let Some(path) = &args.config {
        return config::load_config(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let url = args
        .url
        .clone()
        .context("a target URL (or --config <file>) is required")?;

    let mut config = RunConfig::for_target(&url);
    config.mode = args.mode;
    config.max_pages = args.max_pages;
    config.max_depth = args.depth;
    config.request_delay_ms = args.delay_ms;
    config.output_dir = args.output.clone();
    if let Some(urls) = &args.urls {
        config.custom_urls = vec![urls.clone()];
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    let config = build_config(&args)?;
    tracing::info!(
        "Cloning {} (mode: {}, max pages: {})",
        config.target_url,
        config.mode,
        config.max_pages
    );

    let stats = run_clone(&config).await.context("clone run failed")?;
    report::print_summary(&stats);

    Ok(())
}
