use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::db::{MemoryStore, PgStore, Store};
use crate::payments::gateway::{PaymentGateway, StripeGateway};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.store {
            StoreBackend::Postgres { database_url } => {
                let pg = PgStore::connect(database_url).await?;
                if let Err(e) = pg.migrate().await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(pg) as Arc<dyn Store>
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new()) as Arc<dyn Store>
            }
        };

        let payments = Arc::new(StripeGateway::new(&config.payment)?) as Arc<dyn PaymentGateway>;

        Ok(Self::from_parts(store, config, payments))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: Arc<AppConfig>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            store,
            config,
            payments,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::payments::gateway::GatewayError;
        use async_trait::async_trait;

        struct FakeGateway;
        #[async_trait]
        impl PaymentGateway for FakeGateway {
            async fn create_intent(&self, amount_minor: i64) -> Result<String, GatewayError> {
                Ok(format!("pi_fake_{amount_minor}_secret"))
            }
        }

        let config = Arc::new(AppConfig {
            store: StoreBackend::Memory,
            jwt: crate::config::JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_days: 365,
            },
            payment: crate::config::PaymentConfig {
                secret_key: "sk_fake".into(),
                api_base: "http://payments.invalid".into(),
                currency: "usd".into(),
            },
            production: false,
            cors_origins: vec!["http://localhost:5173".into()],
        });

        Self::from_parts(Arc::new(MemoryStore::new()), config, Arc::new(FakeGateway))
    }
}
