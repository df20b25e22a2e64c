pub mod chat;
pub mod health;
pub mod products;

pub use chat::chat_config;
pub use health::health_check;
pub use products::list_products;
