use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    ///
    /// `DATABASE_URL` wins; otherwise the URL is composed from the `DB_*` parts.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let user = get("DB_USER").context("DATABASE_URL or DB_USER must be set")?;
                let password = get("DB_PASSWORD").unwrap_or_default();
                let name = get("DB_NAME").context("DATABASE_URL or DB_NAME must be set")?;
                let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
                let port = get("DB_PORT").unwrap_or_else(|| "5432".into());
                format!("postgres://{user}:{password}@{host}:{port}/{name}")
            }
        };

        let secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        anyhow::ensure!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let port = match get("APP_PORT") {
            Some(p) => p.parse().with_context(|| format!("invalid APP_PORT {p:?}"))?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            jwt: JwtConfig { secret },
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}
