use crate::error::Result;
use crate::models::{NewProduct, Product, EMBEDDING_DIM};
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Persistent product collection with similarity-ordered retrieval.
/// Implemented over Postgres + pgvector in production; tests substitute an
/// in-memory fake.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All products, store order.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Exact-match lookup used by the ingestion duplicate check.
    async fn find_by_title(&self, title: &str) -> Result<Option<Product>>;

    async fn insert(&self, product: NewProduct) -> Result<Product>;

    /// The `k` nearest products by L2 distance to `embedding`, ascending.
    /// No distance threshold: the nearest rows are returned even when they
    /// are semantically distant, and the generation step judges quality.
    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<Product>>;
}

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Creates the vector extension and the products table. Title
    /// uniqueness is deliberately not a constraint here; the ingestion
    /// pipeline enforces it with an exact-match lookup.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS products (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                price TEXT NOT NULL,
                description TEXT NOT NULL,
                features TEXT NOT NULL,
                image_url TEXT NOT NULL,
                category TEXT NOT NULL,
                product_url TEXT NOT NULL,
                embedding VECTOR({}) NOT NULL
            )",
            EMBEDDING_DIM
        );
        sqlx::query(&ddl).execute(&self.pool).await?;

        info!("Catalog schema ready");
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn list(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, title, price, description, features, image_url, category, product_url, embedding
             FROM products
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, title, price, description, features, image_url, category, product_url, embedding
             FROM products
             WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product> {
        let inserted = sqlx::query_as::<_, Product>(
            "INSERT INTO products
                 (title, price, description, features, image_url, category, product_url, embedding)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, title, price, description, features, image_url, category, product_url, embedding",
        )
        .bind(product.title)
        .bind(product.price)
        .bind(product.description)
        .bind(product.features)
        .bind(product.image_url)
        .bind(product.category)
        .bind(product.product_url)
        .bind(Vector::from(product.embedding))
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn nearest(&self, embedding: &[f32], k: usize) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, title, price, description, features, image_url, category, product_url, embedding
             FROM products
             ORDER BY embedding <-> $1
             LIMIT $2",
        )
        .bind(Vector::from(embedding.to_vec()))
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}
