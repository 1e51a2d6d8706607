use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::{Local, NaiveDate};
use clap::{Args as ClapArgs, Parser, Subcommand};
use marquee_core::{SnapshotRepository, StatisticsEngine, fetch::ListingClient, pipeline};
use marquee_server::{AppState, Config, create_app};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "marquee-server")]
#[command(about = "Daily movie listing snapshots with an HTTP read API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT", global = true)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST", global = true)]
    host: Option<String>,

    /// Snapshot directory (overrides config)
    #[arg(long, env = "MARQUEE_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP read API (default)
    Serve,
    /// Extract listings and write the snapshot for a day
    Ingest(IngestArgs),
    /// Print the summary sentence for the newest snapshot
    Stats(StatsArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct StatsArgs {
    /// Also print how many movies carry each rating
    #[arg(long)]
    counts: bool,
}

#[derive(ClapArgs, Debug, Clone)]
struct IngestArgs {
    /// Read the listing page from a saved HTML file
    #[arg(long, conflicts_with = "fetch")]
    html: Option<PathBuf>,

    /// Download the listing page and archive it next to the snapshots
    #[arg(long)]
    fetch: bool,

    /// Snapshot date (YYYY-MM-DD); defaults to today in local time
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Maximum listings to collect (overrides MARQUEE_LISTING_LIMIT)
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Override via RUST_LOG.
                "info,marquee_core=info,tower_http=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config(&cli.serve)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(config).await,
        Command::Ingest(args) => run_ingest(config, args).await,
        Command::Stats(args) => run_stats(config, args).await,
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<Config> {
    let mut config = Config::from_env().context("failed to load configuration")?;

    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host.clone() {
        config.server_host = host;
    }
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }

    Ok(config)
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    if !config.data_dir.is_dir() {
        warn!(
            data_dir = %config.data_dir.display(),
            "snapshot directory does not exist yet; reads will answer 404 until an ingest runs"
        );
    }

    let data_dir = config.data_dir.clone();
    let app = create_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, data_dir = %data_dir.display(), "marquee server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn run_ingest(config: Config, args: IngestArgs) -> anyhow::Result<()> {
    let repository = SnapshotRepository::new(&config.data_dir);
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let options = config.finalize_options(args.limit);

    let html = if let Some(path) = &args.html {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read listing page {}", path.display()))?
    } else if args.fetch {
        let client = ListingClient::with_user_agent(config.listing_url.clone(), &config.user_agent)?;
        let html = client
            .fetch_page()
            .await
            .with_context(|| format!("failed to fetch {}", client.url()))?;
        let archived = repository.archive_page(date, &html)?;
        info!(path = %archived.display(), "listing page archived");
        html
    } else {
        let page = repository.latest_page()?.ok_or_else(|| {
            anyhow!(
                "no archived listing page in {}; pass --fetch or --html",
                repository.dir().display()
            )
        })?;
        info!(path = %page.path.display(), page_date = %page.date, "replaying archived listing page");
        page.html
    };

    let report = tokio::task::spawn_blocking(move || {
        pipeline::ingest_html(&repository, &html, date, &options)
    })
    .await
    .context("ingest task failed")??;

    println!(
        "Wrote {} movies to {} ({} dropped)",
        report.stored,
        report.path.display(),
        report.dropped
    );
    Ok(())
}

async fn run_stats(config: Config, args: StatsArgs) -> anyhow::Result<()> {
    let repository = SnapshotRepository::new(&config.data_dir);
    let (summary, counts) = tokio::task::spawn_blocking(move || {
        let snapshot = repository.latest()?;
        let stats = StatisticsEngine::new();
        let counts = args.counts.then(|| {
            (
                stats.rating_counts(snapshot.records()),
                stats.rated_count(snapshot.records()),
                snapshot.len(),
            )
        });
        Ok::<_, marquee_core::CatalogError>((stats.summarize(&snapshot), counts))
    })
    .await
    .context("stats task failed")??;

    println!("{summary}");
    if let Some((by_rating, rated, total)) = counts {
        for (rating, count) in by_rating {
            println!("  {rating}: {count}");
        }
        println!("  {rated} of {total} movies carry a rating");
    }
    Ok(())
}
