use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};

use chirp_core::feed::*;
use chirp_feed::{feed, like, tweet};

use crate::{error::Result, state::AppState, util::Viewer};

pub fn tweet_router() -> Router<AppState> {
    Router::new()
        .route("/tweet", post(create_tweet))
        .route("/tweet/feed", post(get_feed))
        .route("/tweet/:id/like", post(toggle_like))
}

pub(crate) async fn get_feed(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<FeedRequest>,
) -> Result<Json<FeedPage>> {
    let db = &mut app_state.pool.get()?;
    let page = feed::fetch_page(db, viewer.id(), &request)?;

    Ok(Json(page))
}

pub(crate) async fn create_tweet(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<NewTweetRequest>,
) -> Result<Json<TweetView>> {
    let viewer_id = viewer.require("Tweeting")?;
    let db = &mut app_state.pool.get()?;
    let tweet = tweet::create_tweet(db, viewer_id, &request.content)?;

    Ok(Json(tweet))
}

pub(crate) async fn toggle_like(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<ToggleLikeResponse>> {
    let viewer_id = viewer.require("Liking a tweet")?;
    let db = &mut app_state.pool.get()?;
    let response = like::toggle_like(db, viewer_id, &id)?;

    Ok(Json(response))
}
