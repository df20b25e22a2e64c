//! The recommendation pipeline: classify, embed, retrieve, explain, shape.

use crate::error::{ApiError, Result};
use crate::models::{ChatResponse, Product};
use crate::services::catalog::ProductCatalog;
use crate::services::classifier::{canned_reply, classify};
use crate::services::embedder::{EmbeddingProvider, EmbeddingTask};
use crate::services::generator::GenerationProvider;
use crate::services::prompt::{build_prompt, parse_reply, ParsedReply};
use tracing::{debug, info, warn};

/// Number of nearest products retrieved per query. No relevance threshold
/// is applied on top; the generation step is the quality judge.
pub const TOP_K: usize = 4;

pub const NO_MATCH_REPLY: &str = "Sorry, I couldn't find any matching products.";
pub const FALLBACK_REPLY: &str = "I'm having trouble thinking right now.";

/// Pipeline output before response shaping. `products` is discarded by
/// [`Recommendation::into_response`] when `clarifying` is set.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub reply: String,
    pub clarifying: bool,
    pub products: Vec<Product>,
}

impl Recommendation {
    fn canned(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            clarifying: false,
            products: Vec::new(),
        }
    }

    pub fn into_response(self) -> ChatResponse {
        let recommended_products = if self.clarifying {
            Vec::new()
        } else {
            self.products.iter().map(Product::public).collect()
        };
        ChatResponse {
            response: self.reply,
            recommended_products,
        }
    }
}

/// Stateless per-request orchestration over the three collaborators. The
/// trait parameters keep the pipeline testable with fakes; the server
/// instantiates it once with the real clients and shares it across workers.
pub struct ChatService<E, G, C> {
    embedder: E,
    generator: G,
    catalog: C,
}

impl<E, G, C> ChatService<E, G, C>
where
    E: EmbeddingProvider,
    G: GenerationProvider,
    C: ProductCatalog,
{
    pub fn new(embedder: E, generator: G, catalog: C) -> Self {
        Self {
            embedder,
            generator,
            catalog,
        }
    }

    pub async fn chat(&self, query: &str) -> Result<Recommendation> {
        // Conversational guard: canned replies must not cost an embedding
        // or generation call.
        let kind = classify(query);
        if let Some(reply) = canned_reply(kind) {
            debug!(?kind, "Conversational query, skipping pipeline");
            return Ok(Recommendation::canned(reply));
        }

        // Without a query vector no search is possible, so this failure is
        // the caller's problem.
        let query_vector = self
            .embedder
            .embed(query, EmbeddingTask::Query)
            .await
            .map_err(|e| match e {
                ApiError::Embedding(_) => e,
                other => ApiError::Embedding(other.to_string()),
            })?;

        let products = self.catalog.nearest(&query_vector, TOP_K).await?;
        if products.is_empty() {
            info!("Catalog returned no products for query");
            return Ok(Recommendation::canned(NO_MATCH_REPLY));
        }

        let prompt = build_prompt(query, &products);
        let raw_reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                // Degraded but non-fatal: the product list is still useful
                // without the explanation.
                warn!("Generation failed, using fallback reply: {}", e);
                return Ok(Recommendation {
                    reply: FALLBACK_REPLY.to_string(),
                    clarifying: false,
                    products,
                });
            }
        };

        let recommendation = match parse_reply(&raw_reply) {
            ParsedReply::Clarification(reply) => Recommendation {
                reply,
                clarifying: true,
                products,
            },
            ParsedReply::Recommendation(reply) => Recommendation {
                reply,
                clarifying: false,
                products,
            },
        };

        info!(
            clarifying = recommendation.clarifying,
            products = recommendation.products.len(),
            "Chat pipeline complete"
        );
        Ok(recommendation)
    }
}
