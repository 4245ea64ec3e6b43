mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::{io, sync::Arc};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppConfig,
    database::{MongoDB, RecordStore, UserStore},
};

fn build_cors(config: &AppConfig) -> Cors {
    if config.development {
        return Cors::permissive();
    }

    config
        .cors_allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    utils::expose_internal_errors(config.development);

    log::info!("🚀 Starting Practice Tracker...");
    log::info!("📊 Database: {}", config.mongodb_database);
    if config.development {
        log::warn!("⚠️  Development mode: CORS is permissive and internal errors are exposed");
    }

    let db = MongoDB::connect(&config.mongodb_uri, &config.mongodb_database)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            io::Error::new(io::ErrorKind::ConnectionRefused, e.to_string())
        })?;
    log::info!("✅ MongoDB connected successfully");

    let db = Arc::new(db);
    let record_store: web::Data<dyn RecordStore> = web::Data::from(db.clone() as Arc<dyn RecordStore>);
    let user_store: web::Data<dyn UserStore> = web::Data::from(db as Arc<dyn UserStore>);

    let bind_address = config.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);
    log::info!("📄 OpenAPI spec at: http://{}/api-docs/openapi.json", bind_address);

    let config_data = web::Data::new(config);
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(record_store.clone())
            .app_data(user_store.clone())
            .wrap(build_cors(&config_data))
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(api::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
