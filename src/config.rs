use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub cors_allowed_origin: String,
}

/// Token signing settings shared by the issuer and the request extractor.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiry_minutes: i64,
}

/// `DATABASE_URL` alone, for tools that never sign tokens.
pub fn database_url() -> anyhow::Result<String> {
    env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = database_url()?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:4200".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt: JwtConfig::from_env()?,
            cors_allowed_origin,
        })
    }
}

impl JwtConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "home-store-api".to_string());
        let audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "home-store-client".to_string());
        let expiry_minutes = env::var("JWT_EXPIRY_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(60);
        Ok(Self {
            secret,
            issuer,
            audience,
            expiry_minutes,
        })
    }
}
