pub mod auth;
pub mod health;
pub mod questions;
pub mod swagger;

use actix_web::web;

use crate::{middleware::AuthMiddleware, utils::ApiError};

/// Registers every route plus the extractor configs that turn malformed
/// bodies and query strings into `{ "message": ... }` 400 responses.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::validation(err.to_string()).into()),
    )
    // Health check
    .route("/health", web::get().to(health::health_check))
    // Auth endpoints
    .service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(auth::signup))
            .route("/login", web::post().to(auth::login)),
    )
    // Practice records (require authentication)
    .service(
        web::scope("/api/questions")
            .wrap(AuthMiddleware)
            .route("", web::get().to(questions::list_questions))
            .route("", web::post().to(questions::create_question))
            .route("/user", web::get().to(questions::get_profile))
            .route("/progress", web::get().to(questions::topic_progress))
            .route("/search", web::get().to(questions::search_questions))
            .route("/byTopic", web::get().to(questions::questions_by_topic))
            .route("/byRating", web::get().to(questions::questions_by_rating))
            .route("/byDifficulty", web::get().to(questions::questions_by_difficulty))
            .route("/byTimeSpent", web::get().to(questions::questions_by_time_spent))
            .route("/{id}", web::patch().to(questions::update_question))
            .route("/{id}", web::delete().to(questions::delete_question)),
    );
}
