use std::sync::Arc;
use axum::extract::FromRef;
use sea_orm::prelude::*;

use tabbycat_entities::images::{DatabaseFileStorage, UPLOAD_TO};

use crate::cache::CacheManager;
use crate::config::Config;
use crate::db::{self, DatabaseConfig};


#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: Arc<CacheManager>,
    pub storage: DatabaseFileStorage,
    pub max_upload_size: usize,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<AppState, anyhow::Error> {
        let db = db::set_up_db(DatabaseConfig::new(config.db_url.clone())).await?;
        Self::new_with_db(db, config)
    }

    pub fn new_with_db(db: DatabaseConnection, config: &Config) -> Result<AppState, anyhow::Error> {
        Ok(AppState {
            db,
            cache: Arc::new(CacheManager::new(config.cache_size)),
            storage: DatabaseFileStorage::new(UPLOAD_TO)?,
            max_upload_size: config.max_upload_size,
        })
    }

    pub async fn new_test_app() -> AppState {
        let config = Config {
            db_url: "sqlite::memory:".into(),
            ..Default::default()
        };
        Self::new(&config).await.expect("Failed to set up test database")
    }
}

impl FromRef<AppState> for DatabaseConnection {
    fn from_ref(app_state: &AppState) -> DatabaseConnection {
        app_state.db.clone()
    }
}

impl FromRef<AppState> for Arc<CacheManager> {
    fn from_ref(app_state: &AppState) -> Arc<CacheManager> {
        app_state.cache.clone()
    }
}

impl FromRef<AppState> for DatabaseFileStorage {
    fn from_ref(app_state: &AppState) -> DatabaseFileStorage {
        app_state.storage.clone()
    }
}
