use crate::{
    config::Config,
    error::Result,
    routes::api_routes,
    services::{ChatService, GeminiEmbedder, GeminiGenerator, PgCatalog},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::info;
use std::net::TcpListener;

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        // Always bind to 0.0.0.0 for container compatibility
        let bind_address = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Starting server at http://{}:{}", self.host, self.port);

        self.run_with_listener(listener).await
    }

    /// Run the server with a specific TCP listener
    /// This is useful for testing where we want to use a random port
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        // Collaborators are constructed once here and passed down; there is
        // no module-level state. The pool opens at process start and closes
        // when the server drops it.
        let catalog = PgCatalog::connect(&self.config.database_url)
            .await
            .context("Failed to connect to the catalog store")?;
        catalog
            .ensure_schema()
            .await
            .context("Failed to prepare the catalog schema")?;

        let embedder = GeminiEmbedder::new(&self.config)?;
        let generator = GeminiGenerator::new(&self.config)?;

        let chat_service =
            web::Data::new(ChatService::new(embedder, generator, catalog.clone()));
        let catalog = web::Data::new(catalog);

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(chat_service.clone())
                .app_data(catalog.clone())
                .configure(api_routes)
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}
