use actix_web::web;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::JwtSettings,
    database::UserStore,
    models::User,
    utils::ApiError,
};

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration
    pub jti: String, // JWT ID
    pub aud: String, // audience
    pub iss: String, // issuer
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub message: String,
}

lazy_static! {
    // Verified against when the email is unknown, so both login failures cost one bcrypt check
    static ref DUMMY_HASH: String =
        bcrypt::hash("practice-tracker-dummy", bcrypt::DEFAULT_COST).unwrap_or_default();
}

/// Trimmed, non-empty value of a required field.
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Passwords are used exactly as sent; blank ones count as missing.
fn required_password(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

// Generate JWT token
pub fn generate_jwt(settings: &JwtSettings, user_id: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(settings.ttl_minutes)).timestamp() as usize,
        jti: Uuid::new_v4().to_string(),
        aud: settings.audience.clone(),
        iss: settings.issuer.clone(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
}

// Verify JWT token
pub fn verify_token(settings: &JwtSettings, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

// User registration
pub async fn register(
    users: &dyn UserStore,
    settings: &JwtSettings,
    bcrypt_cost: u32,
    request: &SignupRequest,
) -> Result<AuthResponse, ApiError> {
    let (Some(username), Some(email), Some(password)) = (
        required(&request.username),
        required(&request.email),
        required_password(&request.password),
    ) else {
        return Err(ApiError::validation("All fields are required"));
    };

    // Email collisions are reported ahead of username collisions
    if users.find_by_email(email).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }
    if users.find_by_username(username).await?.is_some() {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let plaintext = password.to_string();
    let hashed = web::block(move || bcrypt::hash(plaintext, bcrypt_cost)).await??;

    let user = User::new(username, email, hashed);
    users.insert_user(&user).await?;

    let token = generate_jwt(settings, &user.user_id)?;
    log::info!("✅ User registered successfully: {}", user.user_id);

    Ok(AuthResponse {
        token,
        user_id: user.user_id,
        message: "User created successfully".to_string(),
    })
}

// User login
pub async fn login(
    users: &dyn UserStore,
    settings: &JwtSettings,
    request: &LoginRequest,
) -> Result<AuthResponse, ApiError> {
    let (Some(email), Some(password)) =
        (required(&request.email), required_password(&request.password))
    else {
        return Err(ApiError::validation("All fields are required"));
    };

    let user = users.find_by_email(email).await?;

    let plaintext = password.to_string();
    let stored_hash = user.as_ref().map(|user| user.password.clone());
    let verified = web::block(move || {
        let hash = stored_hash.as_deref().unwrap_or(DUMMY_HASH.as_str());
        bcrypt::verify(plaintext, hash)
    })
    .await?;

    let Some(user) = user else {
        return Err(ApiError::InvalidCredentials);
    };
    if !verified? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = generate_jwt(settings, &user.user_id)?;

    Ok(AuthResponse {
        token,
        user_id: user.user_id,
        message: "Login successful".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    const TEST_COST: u32 = 4;

    fn settings() -> JwtSettings {
        JwtSettings {
            secret: "test-secret".into(),
            issuer: "practice-tracker".into(),
            audience: "practice-tracker-users".into(),
            ttl_minutes: 60,
        }
    }

    fn signup(username: &str, email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            username: Some(username.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    fn login_with(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[actix_web::test]
    async fn register_issues_token_for_new_user() {
        let store = MemoryStore::new();
        let response = register(&store, &settings(), TEST_COST, &signup("ada", "ada@example.com", "hunter22"))
            .await
            .unwrap();

        let claims = verify_token(&settings(), &response.token).unwrap();
        assert_eq!(claims.sub, response.user_id);
        assert_eq!(claims.exp - claims.iat, 3600);

        let stored = store.find_by_user_id(&response.user_id).await.unwrap().unwrap();
        assert_eq!(stored.username, "ada");
        assert_ne!(stored.password, "hunter22");
        assert!(bcrypt::verify("hunter22", &stored.password).unwrap());
    }

    #[actix_web::test]
    async fn register_requires_every_field() {
        let store = MemoryStore::new();
        let mut request = signup("ada", "ada@example.com", "hunter22");
        request.email = Some("   ".into());

        let err = register(&store, &settings(), TEST_COST, &request).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "All fields are required"));

        request.email = None;
        assert!(register(&store, &settings(), TEST_COST, &request).await.is_err());
    }

    #[actix_web::test]
    async fn email_conflict_takes_priority() {
        let store = MemoryStore::new();
        register(&store, &settings(), TEST_COST, &signup("ada", "ada@example.com", "pw-1")).await.unwrap();
        register(&store, &settings(), TEST_COST, &signup("grace", "grace@example.com", "pw-2")).await.unwrap();

        // Same email as ada, same username as grace
        let err = register(&store, &settings(), TEST_COST, &signup("grace", "ada@example.com", "pw-3"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Email already in use"));

        let err = register(&store, &settings(), TEST_COST, &signup("ada", "new@example.com", "pw-4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "Username already taken"));
    }

    #[actix_web::test]
    async fn login_does_not_reveal_which_field_was_wrong() {
        let store = MemoryStore::new();
        register(&store, &settings(), TEST_COST, &signup("ada", "ada@example.com", "hunter22")).await.unwrap();

        let wrong_password = login(&store, &settings(), &login_with("ada@example.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = login(&store, &settings(), &login_with("who@example.com", "hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[actix_web::test]
    async fn login_returns_fresh_token() {
        let store = MemoryStore::new();
        let registered = register(&store, &settings(), TEST_COST, &signup("ada", "ada@example.com", "hunter22"))
            .await
            .unwrap();

        let response = login(&store, &settings(), &login_with("ada@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(response.user_id, registered.user_id);
        assert_eq!(response.message, "Login successful");
        assert_eq!(verify_token(&settings(), &response.token).unwrap().sub, registered.user_id);
    }

    #[actix_web::test]
    async fn password_is_not_trimmed() {
        let store = MemoryStore::new();
        register(&store, &settings(), TEST_COST, &signup("ada", "ada@example.com", "hunter22 "))
            .await
            .unwrap();

        let trimmed = login(&store, &settings(), &login_with("ada@example.com", "hunter22")).await;
        assert!(matches!(trimmed, Err(ApiError::InvalidCredentials)));

        let exact = login(&store, &settings(), &login_with("ada@example.com", "hunter22 ")).await;
        assert!(exact.is_ok());

        let blank = login(&store, &settings(), &login_with("ada@example.com", "   ")).await;
        assert!(matches!(blank, Err(ApiError::Validation(_))));
    }

    #[test]
    fn unknown_email_path_checks_a_real_hash() {
        assert_eq!(DUMMY_HASH.len(), 60);
        assert_eq!(bcrypt::verify("practice-tracker-dummy", DUMMY_HASH.as_str()).ok(), Some(true));
        assert_eq!(bcrypt::verify("hunter22", DUMMY_HASH.as_str()).ok(), Some(false));
    }

    #[test]
    fn rejects_tampered_foreign_and_expired_tokens() {
        let token = generate_jwt(&settings(), "user-1").unwrap();

        let mut other_secret = settings();
        other_secret.secret = "another-secret".into();
        assert!(matches!(verify_token(&other_secret, &token), Err(ApiError::Unauthorized(_))));

        let mut other_audience = settings();
        other_audience.audience = "someone-else".into();
        assert!(verify_token(&other_audience, &token).is_err());

        let mut expired = settings();
        expired.ttl_minutes = -5;
        let stale = generate_jwt(&expired, "user-1").unwrap();
        assert!(verify_token(&settings(), &stale).is_err());

        assert!(verify_token(&settings(), "not-a-jwt").is_err());
    }
}
