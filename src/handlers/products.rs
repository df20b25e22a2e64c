use crate::{
    error::ApiError,
    models::{Product, PublicProduct},
    services::{PgCatalog, ProductCatalog},
};
use actix_web::{get, web, HttpResponse};

/// Lists the catalog through the public projection; embeddings never leave
/// the store through this endpoint.
#[get("/products")]
pub async fn list_products(
    catalog: web::Data<PgCatalog>,
) -> Result<HttpResponse, ApiError> {
    let products = catalog.list().await?;
    let public: Vec<PublicProduct> = products.iter().map(Product::public).collect();
    Ok(HttpResponse::Ok().json(public))
}
