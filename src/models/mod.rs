use serde::{Deserialize, Serialize};

pub use product::{NewProduct, Product, PublicProduct, EMBEDDING_DIM};

mod product;

/// Query parameters for the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatParams {
    pub query: String,
}

/// Response body for the chat endpoint. `recommended_products` is empty
/// exactly when the assistant answered with a clarifying question (or the
/// query never reached retrieval).
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub recommended_products: Vec<PublicProduct>,
}

/// Health check response structure
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
