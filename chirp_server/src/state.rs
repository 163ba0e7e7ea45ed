use chirp_feed::DatabasePool;

#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: DatabasePool,
}
