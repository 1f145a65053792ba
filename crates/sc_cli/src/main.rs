use clap::Parser;
use sc_core::{ExtractorConfig, FetcherConfig, Result};
use sc_scrapers::cli::{handle_articles, handle_scrape, ArticleCommands, ScrapeArgs};
use sc_scrapers::logging::{init_logging, level_from_verbosity};
use sc_scrapers::{ListingExtractor, ProfileFetcher, ScrapeJob};
use sc_storage::StoreKind;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape profile articles into the showcase store", long_about = None)]
pub struct Cli {
    /// Store backend
    #[arg(long, value_enum, env = "SHOWCASE_STORE", default_value = "sqlite", global = true)]
    store: StoreKind,
    /// SQLite database file
    #[arg(long, env = "SHOWCASE_DATABASE", default_value = "articles.db", global = true)]
    database: PathBuf,
    /// Site origin profiles are fetched from and links resolved against
    #[arg(long, env = "SHOWCASE_PROFILE_BASE", default_value = sc_core::config::DEFAULT_SITE, global = true)]
    profile_base: String,
    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,
    /// More output; repeat for trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Scrape a profile page and upsert its articles
    Scrape(ScrapeArgs),
    /// Inspect stored articles
    Articles {
        #[command(subcommand)]
        command: ArticleCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(level_from_verbosity(cli.verbose));

    let store = sc_storage::create_storage(cli.store, &cli.database).await?;
    info!("💾 Store initialized (using {})", store.name());

    match cli.command {
        Commands::Scrape(args) => {
            let fetcher = ProfileFetcher::new(
                FetcherConfig::default()
                    .with_profile_base(cli.profile_base.clone())
                    .with_timeout(Duration::from_secs(cli.timeout)),
            )?;
            let extractor =
                ListingExtractor::new(&ExtractorConfig::default().with_base_url(cli.profile_base))?;
            let job = ScrapeJob::new(&fetcher, &extractor, store.as_ref());
            handle_scrape(args, &job).await?;
        }
        Commands::Articles { command } => {
            handle_articles(command, store.as_ref()).await?;
        }
    }

    Ok(())
}
