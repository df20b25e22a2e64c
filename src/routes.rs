use actix_web::web;

use crate::handlers::{chat_config, health_check, list_products};

/// Configure all routes for the API
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(list_products)
        .configure(chat_config);
}
