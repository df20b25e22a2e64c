use crate::{
    error::ApiError,
    models::ChatParams,
    services::AppChatService,
};
use actix_web::{web, HttpResponse};

pub fn chat_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/chat").route(web::post().to(chat_endpoint)));
}

/// Answers a natural-language shopping query. 400 when the query is empty
/// or cannot be embedded; generation trouble degrades inside the pipeline
/// and still returns 200.
pub async fn chat_endpoint(
    params: web::Query<ChatParams>,
    chat_service: web::Data<AppChatService>,
) -> Result<HttpResponse, ApiError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(ApiError::InvalidInput("Query cannot be empty".to_string()));
    }

    let recommendation = chat_service.chat(query).await?;
    Ok(HttpResponse::Ok().json(recommendation.into_response()))
}
