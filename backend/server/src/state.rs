use std::sync::Arc;

use tracing::{info, warn};

use super::{
    auth::TokenIssuer,
    config::Config,
    database::{RedisInspectionStore, RedisUserStore, init_redis},
    error::AppError,
    memory::{MemoryInspectionStore, MemoryUserStore},
    store::{InspectionStore, UserStore},
};

pub struct AppState {
    pub config: Config,
    pub inspections: Arc<dyn InspectionStore>,
    pub users: Arc<dyn UserStore>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        if config.uses_memory_store() {
            warn!("Using in-memory stores, records will not survive a restart");
            return Ok(Self::in_memory(config));
        }

        let redis_connection = init_redis(&config.redis_url).await?;
        info!("Using redis stores");

        Ok(Self::with_stores(
            config,
            Arc::new(RedisInspectionStore::new(redis_connection.clone())),
            Arc::new(RedisUserStore::new(redis_connection)),
        ))
    }

    pub fn in_memory(config: Config) -> Arc<Self> {
        Self::with_stores(
            config,
            Arc::new(MemoryInspectionStore::new()),
            Arc::new(MemoryUserStore::new()),
        )
    }

    pub fn with_stores(
        config: Config,
        inspections: Arc<dyn InspectionStore>,
        users: Arc<dyn UserStore>,
    ) -> Arc<Self> {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_days);

        Arc::new(Self {
            config,
            inspections,
            users,
            tokens,
        })
    }
}
