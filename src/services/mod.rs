pub mod catalog;
pub mod chat;
pub mod classifier;
pub mod embedder;
pub mod generator;
pub mod prompt;

// Re-export public types
pub use catalog::{PgCatalog, ProductCatalog};
pub use chat::ChatService;
pub use embedder::{EmbeddingProvider, EmbeddingTask, GeminiEmbedder};
pub use generator::{GeminiGenerator, GenerationProvider};

/// The chat service as wired in production.
pub type AppChatService = ChatService<GeminiEmbedder, GeminiGenerator, PgCatalog>;
