use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};

use chirp_core::{feed::*, Error as ChirpError};
use chirp_feed::{feed, profile};

use crate::{error::Result, payload::ProfileFeedRequest, state::AppState, util::Viewer};

pub fn profile_router() -> Router<AppState> {
    Router::new()
        .route("/profile/:id", get(get_profile))
        .route("/profile/:id/feed", post(get_profile_feed))
        .route("/profile/:id/follow", post(toggle_follow))
}

pub(crate) async fn get_profile(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<ProfileView>> {
    let db = &mut app_state.pool.get()?;
    let profile =
        profile::get_profile(db, viewer.id(), &id)?.ok_or(ChirpError::ObjectNotFound(format!("User {}", id)))?;

    Ok(Json(profile))
}

pub(crate) async fn get_profile_feed(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
    Json(request): Json<ProfileFeedRequest>,
) -> Result<Json<FeedPage>> {
    let db = &mut app_state.pool.get()?;
    let page = feed::infinite_profile_feed(db, viewer.id(), &id, request.limit, request.cursor)?;

    Ok(Json(page))
}

pub(crate) async fn toggle_follow(
    State(app_state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<String>,
) -> Result<Json<ToggleFollowResponse>> {
    let viewer_id = viewer.require("Following a user")?;
    let db = &mut app_state.pool.get()?;
    let response = profile::toggle_follow(db, viewer_id, &id)?;

    Ok(Json(response))
}
