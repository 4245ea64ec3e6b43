use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    database::UserStore,
    services::auth_service::{self, AuthResponse, LoginRequest, SignupRequest},
    utils::ApiError,
};

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing fields, or email/username already taken")
    )
)]
pub async fn signup(
    users: web::Data<dyn UserStore>,
    config: web::Data<AppConfig>,
    request: web::Json<SignupRequest>,
) -> Result<HttpResponse, ApiError> {
    log::info!("📝 POST /auth/signup");

    match auth_service::register(users.get_ref(), &config.jwt, config.bcrypt_cost, &request).await {
        Ok(response) => {
            log::info!("✅ Signup successful: {}", response.user_id);
            Ok(HttpResponse::Created().json(response))
        }
        Err(e) => {
            log::warn!("❌ Signup failed: {}", e);
            Err(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid email or password")
    )
)]
pub async fn login(
    users: web::Data<dyn UserStore>,
    config: web::Data<AppConfig>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    log::info!("🔐 POST /auth/login");

    match auth_service::login(users.get_ref(), &config.jwt, &request).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", response.user_id);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            log::warn!("❌ Login failed: {}", e);
            Err(e)
        }
    }
}
