use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use chirp_core::{feed::ToggleLikeResponse, Database, Error, Result};

use crate::model;

/// Like the tweet if the viewer hasn't yet, otherwise take the like back.
///
/// The read and the write run in one immediate transaction, so toggles through
/// the same database are serialized. The `(user_id, tweet_id)` primary key still
/// rejects a duplicate like, which surfaces as `ObjectAlreadyExists`.
pub fn toggle_like(db: Database, viewer_id: &str, tweet_id: &str) -> Result<ToggleLikeResponse> {
    use chirp_core::schema::{tweet, tweet_like};

    db.immediate_transaction(|conn| -> Result<ToggleLikeResponse> {
        let found = tweet::table
            .find(tweet_id)
            .select(tweet::id)
            .first::<String>(conn)
            .optional()?;
        if found.is_none() {
            return Err(Error::ObjectNotFound(format!("Tweet {}", tweet_id)));
        }

        let existing = tweet_like::table
            .find((viewer_id, tweet_id))
            .first::<model::TweetLike>(conn)
            .optional()?;

        if existing.is_some() {
            diesel::delete(tweet_like::table.find((viewer_id, tweet_id))).execute(conn)?;
            tracing::info!("User {} unliked tweet {}", viewer_id, tweet_id);
            return Ok(ToggleLikeResponse { added_like: false });
        }

        let like = model::TweetLike {
            user_id: viewer_id.to_string(),
            tweet_id: tweet_id.to_string(),
        };
        diesel::insert_into(tweet_like::table)
            .values(&like)
            .execute(conn)
            .map_err(|e| insert_like_error(e, viewer_id, tweet_id))?;
        tracing::info!("User {} liked tweet {}", viewer_id, tweet_id);
        Ok(ToggleLikeResponse { added_like: true })
    })
}

fn insert_like_error(e: DieselError, viewer_id: &str, tweet_id: &str) -> Error {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Error::ObjectAlreadyExists(format!("Like of tweet {} by user {}", tweet_id, viewer_id))
        }
        e => Error::from(e),
    }
}
