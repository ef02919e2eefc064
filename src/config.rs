use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: String,
    pub expiration_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: String,
    pub sender: String,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub frontend_url: String,
    pub user_cache_ttl_seconds: u64,
    pub jwt: JwtConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            algorithm: std::env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".into()),
            expiration_seconds: std::env::var("JWT_EXPIRATION_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(3600),
        };
        let mail = MailConfig {
            api_url: std::env::var("MAIL_API_URL").unwrap_or_default(),
            api_key: std::env::var("MAIL_API_KEY").unwrap_or_default(),
            sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "noreply@contactly.local".into()),
        };
        Ok(Self {
            database_url,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            user_cache_ttl_seconds: std::env::var("USER_CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(15 * 60),
            jwt,
            mail,
        })
    }
}
