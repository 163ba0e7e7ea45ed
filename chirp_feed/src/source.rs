use async_trait::async_trait;

use chirp_core::{feed::*, Error, FeedSource, Result};

use crate::setup::DatabasePool;
use crate::{feed, like};

/// Serves feeds straight from the database on behalf of one viewer.
#[derive(Debug, Clone)]
pub struct LocalFeedSource {
    pool: DatabasePool,
    viewer: Option<String>,
}

impl LocalFeedSource {
    pub fn new(pool: DatabasePool, viewer: Option<String>) -> Self {
        Self { pool, viewer }
    }
}

#[async_trait]
impl FeedSource for LocalFeedSource {
    async fn fetch_page(&self, request: &FeedRequest) -> Result<FeedPage> {
        let db = &mut self.pool.get().map_err(anyhow::Error::from)?;
        feed::fetch_page(db, self.viewer.as_deref(), request)
    }

    async fn toggle_like(&self, tweet_id: &str) -> Result<ToggleLikeResponse> {
        let Some(viewer) = &self.viewer else {
            return Err(Error::NotLoggedIn("Liking a tweet needs a viewer".to_string()));
        };
        let db = &mut self.pool.get().map_err(anyhow::Error::from)?;
        like::toggle_like(db, viewer, tweet_id)
    }
}
