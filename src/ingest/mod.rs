//! Catalog ingestion: discover product pages, extract fields, embed, store.
//!
//! Candidates are processed one at a time and committed immediately, so a
//! failure on one product never costs the progress made before it. Every
//! candidate resolves to a typed outcome that the batch loop folds into an
//! [`IngestReport`].

pub mod scrape;

use crate::error::{ApiError, Result};
use crate::models::NewProduct;
use crate::services::catalog::ProductCatalog;
use crate::services::embedder::{EmbeddingProvider, EmbeddingTask};
use async_trait::async_trait;
use reqwest::Client;
use scrape::{clean_price, extract_links, extract_product};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cap on products ingested per run.
pub const MAX_PRODUCTS_PER_RUN: usize = 30;

/// Stored descriptions are bounded; the full page text is not needed for
/// retrieval and keeps prompts small downstream.
const DESCRIPTION_LIMIT: usize = 1000;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches a page as text. The reqwest implementation is used in
/// production; tests feed canned HTML through a fake.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Ingestion(format!("Fetch failed for {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(ApiError::Ingestion(format!(
                "Fetch failed for {}: status {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Ingestion(format!("Body read failed for {}: {}", url, e)))
    }
}

/// Where and how a run ingests.
#[derive(Debug, Clone)]
pub struct IngestSource {
    pub listing_url: String,
    pub category: String,
    pub max_products: usize,
    /// Pause between candidates to respect the source's load.
    pub delay: Duration,
}

impl IngestSource {
    pub fn new(listing_url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            listing_url: listing_url.into(),
            category: category.into(),
            max_products: MAX_PRODUCTS_PER_RUN,
            delay: Duration::from_secs(1),
        }
    }
}

/// Per-run tally of candidate outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum ItemOutcome {
    Inserted,
    DuplicateSkipped,
}

/// Runs one ingestion pass. Only a failure to load the listing page itself
/// is fatal; per-candidate failures are tallied and the batch continues.
pub async fn run<F, E, C>(
    fetcher: &F,
    embedder: &E,
    catalog: &C,
    source: &IngestSource,
) -> Result<IngestReport>
where
    F: PageFetcher,
    E: EmbeddingProvider,
    C: ProductCatalog,
{
    info!("Starting ingestion from {}", source.listing_url);

    let listing_html = fetcher.fetch(&source.listing_url).await?;
    let links = extract_links(&listing_html, &source.listing_url, source.max_products)?;

    if links.is_empty() {
        warn!("No product cards found on the listing page");
        return Ok(IngestReport::default());
    }
    info!("Found {} candidate products", links.len());

    let mut report = IngestReport::default();
    for (idx, url) in links.iter().enumerate() {
        match ingest_one(fetcher, embedder, catalog, source, url).await {
            Ok(ItemOutcome::Inserted) => {
                report.inserted += 1;
                info!("Saved ({}/{}) {}", report.inserted, links.len(), url);
            }
            Ok(ItemOutcome::DuplicateSkipped) => {
                report.skipped += 1;
            }
            Err(e) => {
                report.failed += 1;
                warn!("Candidate {} failed: {}", url, e);
            }
        }

        if idx + 1 < links.len() && !source.delay.is_zero() {
            tokio::time::sleep(source.delay).await;
        }
    }

    info!(
        "Ingestion complete: {} inserted, {} skipped, {} failed",
        report.inserted, report.skipped, report.failed
    );
    Ok(report)
}

async fn ingest_one<F, E, C>(
    fetcher: &F,
    embedder: &E,
    catalog: &C,
    source: &IngestSource,
    url: &str,
) -> Result<ItemOutcome>
where
    F: PageFetcher,
    E: EmbeddingProvider,
    C: ProductCatalog,
{
    let html = fetcher.fetch(url).await?;
    let page = extract_product(&html)?;

    let title = page
        .title
        .ok_or_else(|| ApiError::Ingestion(format!("No title found at {}", url)))?;

    if catalog.find_by_title(&title).await?.is_some() {
        debug!("Skipping {}, already in the catalog", title);
        return Ok(ItemOutcome::DuplicateSkipped);
    }

    let price = clean_price(page.price.as_deref().unwrap_or(""));
    let description = bound_chars(
        page.description.as_deref().unwrap_or(title.as_str()),
        DESCRIPTION_LIMIT,
    );

    let document = format!(
        "Product: {}. Description: {}. Price: {}",
        title, description, price
    );
    let embedding = embedder.embed(&document, EmbeddingTask::Document).await?;

    catalog
        .insert(NewProduct {
            title,
            price,
            description,
            features: source.category.clone(),
            image_url: page.image_url.unwrap_or_default(),
            category: source.category.clone(),
            product_url: url.to_string(),
            embedding,
        })
        .await?;

    Ok(ItemOutcome::Inserted)
}

fn bound_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
