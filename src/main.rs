use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

use tamada::build::build_site;
use tamada::config::Config;
use tamada::tours::TourFilters;

/// Build a travel-blog site: blog pages from the posts directory plus a tour
/// catalog fetched from the tour API.
#[derive(Parser)]
#[command(name = "tamada", version)]
struct Args {
    /// Project directory containing `tamada.yaml` (searched upward)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Output directory for the generated site
    #[arg(short, long, default_value = "public")]
    output: PathBuf,

    /// Override the tour API base URL from the project config
    #[arg(long)]
    api_url: Option<Url>,

    /// Only list tours at or above this price
    #[arg(long)]
    min_price: Option<u64>,

    /// Only list tours at or below this price
    #[arg(long)]
    max_price: Option<u64>,

    /// Only list tours of exactly this many days
    #[arg(long)]
    duration: Option<u64>,

    /// Only list tours in this region
    #[arg(long)]
    region: Option<String>,

    /// Only list tours departing on or after this date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = Config::from_directory(&args.project, &args.output, args.api_url)?;
    let filters = TourFilters {
        min_price: args.min_price,
        max_price: args.max_price,
        duration: args.duration,
        region: args.region,
        start_date: args.start_date,
    };
    build_site(config, &filters)?;
    Ok(())
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tamada=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tamada=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
        .init();
}
