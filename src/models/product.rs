use pgvector::Vector;
use serde::Serialize;
use sqlx::FromRow;

/// Dimension of `text-embedding-004` vectors; the `products.embedding`
/// column is declared with the same size, so switching embedding models is
/// a schema migration rather than a config change.
pub const EMBEDDING_DIM: usize = 768;

/// A catalog row. Deliberately not `Serialize`: the only way to put a
/// product on the wire is through [`Product::public`], which drops the
/// embedding.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub description: String,
    pub features: String,
    pub image_url: String,
    pub category: String,
    pub product_url: String,
    pub embedding: Vector,
}

/// A product as accepted by the catalog; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub price: String,
    pub description: String,
    pub features: String,
    pub image_url: String,
    pub category: String,
    pub product_url: String,
    pub embedding: Vec<f32>,
}

/// Serialization view of a product with the embedding excluded.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicProduct {
    pub id: i64,
    pub title: String,
    pub price: String,
    pub description: String,
    pub features: String,
    pub image_url: String,
    pub category: String,
    pub product_url: String,
}

impl Product {
    pub fn public(&self) -> PublicProduct {
        PublicProduct {
            id: self.id,
            title: self.title.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
            features: self.features.clone(),
            image_url: self.image_url.clone(),
            category: self.category.clone(),
            product_url: self.product_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Product {
        Product {
            id: 7,
            title: "Scalp Serum".to_string(),
            price: "₹ 951".to_string(),
            description: "A lightweight serum.".to_string(),
            features: "Hair Care".to_string(),
            image_url: "https://cdn.example.com/serum.jpg".to_string(),
            category: "Hair Care".to_string(),
            product_url: "https://shop.example.com/products/scalp-serum".to_string(),
            embedding: Vector::from(vec![0.0; EMBEDDING_DIM]),
        }
    }

    #[test]
    fn public_projection_never_carries_the_embedding() {
        let value = serde_json::to_value(sample().public()).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("embedding"));
        assert_eq!(object["title"], "Scalp Serum");
        assert_eq!(object["price"], "₹ 951");
    }
}
