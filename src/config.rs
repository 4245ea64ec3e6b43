use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// JWT signing settings shared by the auth service and the auth middleware.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub jwt: JwtSettings,
    pub bcrypt_cost: u32,
    pub development: bool,
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let or_default = |name: &'static str, default: &str| {
            lookup(name).unwrap_or_else(|| default.to_string())
        };

        let jwt = JwtSettings {
            secret: required("JWT_SECRET")?,
            issuer: or_default("JWT_ISSUER", "practice-tracker"),
            audience: or_default("JWT_AUDIENCE", "practice-tracker-users"),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 60)?,
        };

        let cors_allowed_origins = or_default(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        )
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

        Ok(Self {
            host: or_default("HOST", "0.0.0.0"),
            port: parse_or(&lookup, "PORT", 5000)?,
            mongodb_uri: required("MONGODB_URI")?,
            mongodb_database: or_default("MONGODB_DATABASE", "practice_tracker"),
            jwt,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", 12)?,
            development: lookup("APP_ENV")
                .map(|v| v.eq_ignore_ascii_case("development"))
                .unwrap_or(false),
            cors_allowed_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
