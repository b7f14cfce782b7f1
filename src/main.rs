mod api;
mod config;
mod database;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, StoreBackend};
use crate::database::{InMemoryRecordStore, MongoDB, MongoRecordStore, RecordStore};
use crate::services::{LogNotifier, MailgunNotifier, Notifier};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("🚀 Starting Registration Service...");

    // Store: MongoDB in production, memory for local runs
    let (store, mongodb): (Arc<dyn RecordStore>, Option<MongoDB>) = match &config.store {
        StoreBackend::MongoDB { database_url } => {
            let db = MongoDB::new(database_url).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e)
            })?;
            log::info!("✅ MongoDB connected successfully");
            let store: Arc<dyn RecordStore> = Arc::new(MongoRecordStore::new(db.clone()));
            (store, Some(db))
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store, data is lost on restart");
            let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
            (store, None)
        }
    };

    let notifier: Arc<dyn Notifier> = match &config.mailgun {
        Some(mailgun) => {
            log::info!("📧 Mail via Mailgun domain {}", mailgun.domain);
            let notifier = MailgunNotifier::new(
                mailgun.base_url.as_str(),
                mailgun.domain.as_str(),
                mailgun.api_key.as_str(),
                mailgun.from.as_str(),
            )
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            Arc::new(notifier)
        }
        None => {
            log::warn!("⚠️  MAILGUN_API_KEY not set, mails are only logged");
            Arc::new(LogNotifier)
        }
    };

    let state = api::AppState::new(store, notifier);
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);

    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();
        let state = state.clone();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi)
            )
            .configure(|cfg| state.configure(cfg))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    if let Some(db) = mongodb {
        log::info!("👋 Closing MongoDB connections");
        db.shutdown().await;
    }

    Ok(())
}
