//! Shared application state handed to every handler.

use std::sync::Arc;

use glow_db::DbPool;

use crate::config::ServerConfig;
use crate::media::MediaStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<ServerConfig>,
    pub media: Arc<MediaStore>,
}

impl AppState {
    pub fn new(pool: DbPool, config: ServerConfig) -> Self {
        let media = Arc::new(MediaStore::new(config.media_root.clone()));
        Self {
            pool,
            config: Arc::new(config),
            media,
        }
    }
}
