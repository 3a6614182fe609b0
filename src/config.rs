use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Absent or empty means the statistics cache is disabled.
    pub redis_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            expiry_ms: std::env::var("JWT_EXPIRY_MS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24 * 60 * 60 * 1000),
        };
        let redis_url = std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty());
        Ok(Self {
            database_url,
            jwt,
            redis_url,
        })
    }
}
