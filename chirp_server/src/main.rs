mod error;
mod payload;
mod router;
mod state;
#[cfg(test)]
mod test;
mod util;

use axum::Router;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use dotenvy::dotenv;
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::env;
use std::time::Duration;

use chirp_feed::setup::ConnectionOptions;

use crate::state::AppState;

const DEFAULT_POOL_SIZE: u32 = 16;

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()
        .unwrap()
        .add_directive("hyper::proto=info".parse().unwrap())
        .add_directive("tower_http=info".parse().unwrap());
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Initialize database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool_size = env::var("POOL_SIZE")
        .ok()
        .map(|s| s.parse::<u32>().expect("POOL_SIZE must be a positive integer"))
        .unwrap_or(DEFAULT_POOL_SIZE);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .connection_customizer(Box::new(ConnectionOptions {
            enable_wal: true,
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(30)),
            ensure_schema: true,
        }))
        .build(manager)
        .unwrap();

    // 3. Setup state and router
    let app = app(AppState { pool });

    // 4. Start server
    let addr = env::var("SERVER_ADDRESS").expect("SERVER_ADDRESS must be set");
    tracing::info!("Server starting at {}", addr);
    axum::Server::bind(&addr.parse().unwrap())
        .serve(app.into_make_service())
        .await
        .unwrap();
}

fn app(app_state: AppState) -> Router {
    Router::new()
        .merge(router::tweet::tweet_router())
        .merge(router::profile::profile_router())
        .layer(TraceLayer::new_for_http().on_request(()))
        .with_state(app_state)
}
