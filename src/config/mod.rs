use crate::error::{ApiError, Result};
use std::env;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_EMBED_MODEL: &str = "text-embedding-004";
const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub request_timeout_seconds: u64,
    /// Collection page the ingestion run starts from. Only the ingest
    /// binary needs it, so it stays optional for the API server.
    pub source_url: Option<String>,
    pub source_category: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ApiError::Config("PORT must be a number".to_string()))?,
            database_url: require("DATABASE_URL")?,
            gemini_api_key: require("GEMINI_API_KEY")?,
            gemini_base_url: env::var("APP_GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            embed_model: env::var("APP_GEMINI_EMBED_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBED_MODEL.to_string()),
            chat_model: env::var("APP_GEMINI_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            request_timeout_seconds: env::var("APP_GEMINI_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            source_url: env::var("APP_SOURCE_URL").ok(),
            source_category: env::var("APP_SOURCE_CATEGORY")
                .unwrap_or_else(|_| "General".to_string()),
        })
    }
}

fn require(name: &str) -> Result<String> {
    let value =
        env::var(name).map_err(|_| ApiError::Config(format!("{} must be set", name)))?;
    if value.trim().is_empty() {
        return Err(ApiError::Config(format!("{} is empty", name)));
    }
    Ok(value)
}
