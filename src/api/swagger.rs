use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Practice Tracker API",
        version = "1.0.0",
        description = "Personal log of solved coding problems.\n\n**Authentication:** every `/api/questions` endpoint requires a JWT Bearer token obtained from `/api/auth/signup` or `/api/auth/login`."
    ),
    paths(
        // Auth
        crate::api::auth::signup,
        crate::api::auth::login,

        // Health
        crate::api::health::health_check,

        // Questions
        crate::api::questions::list_questions,
        crate::api::questions::create_question,
        crate::api::questions::get_profile,
        crate::api::questions::update_question,
        crate::api::questions::delete_question,
        crate::api::questions::search_questions,
        crate::api::questions::questions_by_topic,
        crate::api::questions::questions_by_difficulty,
        crate::api::questions::questions_by_rating,
        crate::api::questions::questions_by_time_spent,
        crate::api::questions::topic_progress,
    ),
    components(
        schemas(
            crate::services::auth_service::SignupRequest,
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::AuthResponse,
            crate::api::health::HealthResponse,
            crate::models::Platform,
            crate::models::TimeBucket,
            crate::models::NewRecord,
            crate::models::RecordPatch,
            crate::models::RecordResponse,
            crate::models::TopicProgress,
            crate::models::UserProfile,
        )
    ),
    tags(
        (name = "Auth", description = "Account creation and login. Both return a signed token."),
        (name = "Questions", description = "Owner-scoped practice records, filters and per-topic progress."),
        (name = "Health", description = "Liveness and database reachability."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_with_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/signup",
            "/api/auth/login",
            "/health",
            "/api/questions",
            "/api/questions/{id}",
            "/api/questions/progress",
            "/api/questions/byTimeSpent",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
