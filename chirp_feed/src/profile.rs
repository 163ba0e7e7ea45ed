use diesel::prelude::*;

use chirp_core::{
    feed::{AuthorView, ProfileView, ToggleFollowResponse},
    Database, Error, Result,
};

use crate::model;

/// Get a user's profile with tweet and follow counts.
/// `is_following` tells whether the viewer follows this user.
pub fn get_profile(db: Database, viewer: Option<&str>, user_id: &str) -> Result<Option<ProfileView>> {
    use chirp_core::schema::{follow, tweet, user};

    let Some(profile) = user::table.find(user_id).first::<model::User>(db).optional()? else {
        return Ok(None);
    };

    let tweets_count = tweet::table
        .filter(tweet::user_id.eq(user_id))
        .count()
        .get_result::<i64>(db)?;
    let followers_count = follow::table
        .filter(follow::following_id.eq(user_id))
        .count()
        .get_result::<i64>(db)?;
    let follows_count = follow::table
        .filter(follow::follower_id.eq(user_id))
        .count()
        .get_result::<i64>(db)?;
    let is_following = match viewer {
        Some(viewer) => follow::table
            .find((viewer, user_id))
            .first::<model::Follow>(db)
            .optional()?
            .is_some(),
        None => false,
    };

    Ok(Some(ProfileView {
        id: profile.id,
        name: profile.name,
        image: profile.image,
        tweets_count,
        followers_count,
        follows_count,
        is_following,
    }))
}

/// Follow the user if the viewer doesn't yet, otherwise unfollow.
pub fn toggle_follow(db: Database, viewer_id: &str, user_id: &str) -> Result<ToggleFollowResponse> {
    use chirp_core::schema::{follow, user};

    if viewer_id == user_id {
        return Err(Error::InvalidRequest("Cannot follow yourself".to_string()));
    }

    db.immediate_transaction(|conn| -> Result<ToggleFollowResponse> {
        let found = user::table
            .find(user_id)
            .select(user::id)
            .first::<String>(conn)
            .optional()?;
        if found.is_none() {
            return Err(Error::ObjectNotFound(format!("User {}", user_id)));
        }

        let deleted = diesel::delete(follow::table.find((viewer_id, user_id))).execute(conn)?;
        if deleted > 0 {
            tracing::info!("User {} unfollowed user {}", viewer_id, user_id);
            return Ok(ToggleFollowResponse { added_follow: false });
        }

        diesel::insert_into(follow::table)
            .values(model::Follow {
                follower_id: viewer_id.to_string(),
                following_id: user_id.to_string(),
            })
            .execute(conn)?;
        tracing::info!("User {} followed user {}", viewer_id, user_id);
        Ok(ToggleFollowResponse { added_follow: true })
    })
}

/// Provision a user. Called by the authentication layer on first sign-in.
pub fn add_user(db: Database, new_user: &model::NewUser) -> Result<AuthorView> {
    use chirp_core::schema::user;

    let exists = user::table
        .find(&new_user.id)
        .select(user::id)
        .first::<String>(db)
        .optional()?;
    if exists.is_some() {
        return Err(Error::ObjectAlreadyExists(format!("User {}", new_user.id)));
    }

    let result = diesel::insert_into(user::table)
        .values(new_user)
        .returning(model::User::as_returning())
        .get_result(db)?;
    tracing::info!("Added user {}", result.id);
    Ok(AuthorView::from(&result))
}
