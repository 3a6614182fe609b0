use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::service::AuthService;
use crate::auth::token::TokenService;
use crate::config::AppConfig;
use crate::patients::service::PatientService;
use crate::patients::store::{PatientStore, PgPatientStore};
use crate::statistics::cache::{NoopCache, RedisCache, StatisticsCache};
use crate::statistics::service::StatisticsService;
use crate::users::service::UserService;
use crate::users::store::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub patients: Arc<PatientService>,
    pub statistics: Arc<StatisticsService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await?;

        let cache: Arc<dyn StatisticsCache> = match config.redis_url.as_deref() {
            Some(url) => match RedisCache::connect(url).await {
                Ok(cache) => {
                    info!("statistics cache backed by redis");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!(error = %e, "redis unavailable, statistics cache disabled");
                    Arc::new(NoopCache)
                }
            },
            None => {
                info!("REDIS_URL not set, statistics cache disabled");
                Arc::new(NoopCache)
            }
        };

        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));
        let patients: Arc<dyn PatientStore> = Arc::new(PgPatientStore::new(db.clone()));

        Ok(Self::from_parts(db, config, users, patients, cache))
    }

    pub fn from_parts(
        db: PgPool,
        config: Arc<AppConfig>,
        user_store: Arc<dyn UserStore>,
        patient_store: Arc<dyn PatientStore>,
        cache: Arc<dyn StatisticsCache>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt.secret,
            config.jwt.expiry_ms,
        ));
        let auth = Arc::new(AuthService::new(user_store.clone()));
        let users = Arc::new(UserService::new(user_store));
        let patients = Arc::new(PatientService::new(patient_store.clone()));
        let statistics = Arc::new(StatisticsService::new(patient_store, cache));

        Self {
            db,
            config,
            tokens,
            auth,
            users,
            patients,
            statistics,
        }
    }
}
