use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    pub secret_key: String,
    pub api_base: String,
    pub currency: String,
}

/// Which `Store` implementation backs the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    /// Production cookies are `Secure` and `SameSite=None` so the SPA on another origin receives them.
    pub production: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let store = match std::env::var("STORE")
            .unwrap_or_else(|_| "postgres".into())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            },
            other => anyhow::bail!("unknown STORE backend {other:?}"),
        };

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "heartmatch".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "heartmatch-web".into()),
            ttl_days: parse_ttl_days(std::env::var("JWT_TTL_DAYS").ok().as_deref())?,
        };

        let payment = PaymentConfig {
            secret_key: std::env::var("PAYMENT_SECRET_KEY").context("PAYMENT_SECRET_KEY")?,
            api_base: std::env::var("PAYMENT_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".into()),
        };

        let production = std::env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5173,http://localhost:5174".into()),
        );

        Ok(Self {
            store,
            jwt,
            payment,
            production,
            cors_origins,
        })
    }
}

/// Longest session lifetime accepted from `JWT_TTL_DAYS`.
pub const MAX_JWT_TTL_DAYS: i64 = 3650;

fn parse_ttl_days(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(365);
    };
    let days: i64 = raw
        .parse()
        .with_context(|| format!("JWT_TTL_DAYS {raw:?} is not a whole number"))?;
    if !(1..=MAX_JWT_TTL_DAYS).contains(&days) {
        anyhow::bail!("JWT_TTL_DAYS must be between 1 and {MAX_JWT_TTL_DAYS}, got {days}");
    }
    Ok(days)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
