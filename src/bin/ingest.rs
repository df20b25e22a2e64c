//! One-shot ingestion run: scrape the configured collection page, embed
//! each new product and commit it to the catalog.

use anyhow::Context;
use log::info;
use shopscout_api::ingest::{self, HttpFetcher, IngestSource};
use shopscout_api::services::{GeminiEmbedder, PgCatalog};
use shopscout_api::{ApiError, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopscout_api=info,ingest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let listing_url = config.source_url.clone().ok_or_else(|| {
        ApiError::Config("APP_SOURCE_URL must be set for ingestion".to_string())
    })?;

    let catalog = PgCatalog::connect(&config.database_url)
        .await
        .context("Failed to connect to the catalog store")?;
    catalog
        .ensure_schema()
        .await
        .context("Failed to prepare the catalog schema")?;

    let embedder = GeminiEmbedder::new(&config)?;
    let fetcher = HttpFetcher::new(config.request_timeout_seconds)?;
    let source = IngestSource::new(listing_url, config.source_category.clone());

    let report = ingest::run(&fetcher, &embedder, &catalog, &source).await?;
    info!(
        "Ingestion report: {} inserted, {} skipped, {} failed",
        report.inserted, report.skipped, report.failed
    );

    Ok(())
}
