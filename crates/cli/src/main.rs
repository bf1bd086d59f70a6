use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use javbus::{CrawlRequest, HttpTransport, JavbusCrawler, MetadataReport, MosaicHint, MovieMetadata};
use tracing_subscriber::EnvFilter;

/// Fetch movie metadata and artwork from javbus by catalog number.
#[derive(Debug, Parser)]
#[command(name = "javbus-cli", version)]
struct Args {
    /// Catalog number to look up, e.g. ABC-123
    number: String,

    /// Directory for downloaded images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Proxy server, e.g. http://127.0.0.1:7897
    #[arg(short, long)]
    proxy: Option<String>,

    /// Skip resolution and fetch this detail page URL directly
    #[arg(short, long, default_value = "")]
    url: String,

    /// Mosaic hint for search routing (censored/uncensored)
    #[arg(short, long, default_value = "")]
    mosaic: MosaicHint,

    /// Download images even when the site heuristics say no
    #[arg(short = 'd', long)]
    download_images: bool,

    /// Download a single cover.jpg instead of the full artifact set
    #[arg(short = 'c', long)]
    only_cover: bool,

    /// Print the metadata as JSON on stdout
    #[arg(short, long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let client = match build_client(args.proxy.as_deref()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let crawler = JavbusCrawler::new(Arc::new(HttpTransport::with_client(client)));
    let request = CrawlRequest {
        number: args.number,
        output_dir: args.output_dir,
        appoint_url: args.url,
        mosaic: args.mosaic,
        force_download: args.download_images,
        only_cover: args.only_cover,
    };

    tracing::info!("crawling javbus for {}", request.number);
    let record = match crawler.crawl(&request).await {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("crawl failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_summary(&record);

    if record.image_download {
        let count = crawler
            .download_artifacts(&record, &request.output_dir, request.only_cover)
            .await;
        tracing::info!("downloaded {count} images");
    }

    if args.json {
        match serde_json::to_string_pretty(&MetadataReport::from(&record)) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

fn build_client(proxy: Option<&str>) -> reqwest::Result<reqwest::Client> {
    // The site sits behind rotating fronts with mismatched certificates.
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .danger_accept_invalid_certs(true);
    if let Some(proxy) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    builder.build()
}

fn print_summary(record: &MovieMetadata) {
    tracing::info!("title: {}", record.title);
    tracing::info!("number: {}", record.number);
    tracing::info!("actor: {}", record.actor);
    tracing::info!("release: {} (year {})", record.release, record.year);
    tracing::info!("studio: {}", record.studio);
    tracing::info!("publisher: {}", record.publisher);
    tracing::info!("director: {}", record.director);
    tracing::info!("series: {}", record.series);
    tracing::info!("tag: {}", record.tag);
    tracing::info!("runtime: {} min", record.runtime);
    tracing::info!("mosaic: {}", record.mosaic.as_str());
    tracing::info!("website: {}", record.website);
    tracing::info!("thumb: {}", record.thumb);
    tracing::info!("poster: {}", record.poster);
}
