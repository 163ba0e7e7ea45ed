use chrono::Utc;
use diesel::prelude::*;

use chirp_core::{
    feed::{TweetView, MAX_TWEET_LENGTH},
    Database, Error, Result,
};

use crate::{model, util};

/// Post a new tweet as the viewer.
pub fn create_tweet(db: Database, viewer_id: &str, content: &str) -> Result<TweetView> {
    use chirp_core::schema::{tweet, user};

    if content.trim().is_empty() {
        return Err(Error::InvalidRequest("Tweet content is empty".to_string()));
    }
    let length = content.chars().count();
    if length > MAX_TWEET_LENGTH {
        return Err(Error::InvalidRequest(format!(
            "Tweet content has {} characters, at most {} allowed",
            length, MAX_TWEET_LENGTH
        )));
    }

    let author = user::table
        .find(viewer_id)
        .first::<model::User>(db)
        .optional()?
        .ok_or(Error::ObjectNotFound(format!("User {}", viewer_id)))?;

    let new_tweet = model::Tweet {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: viewer_id.to_string(),
        content: content.to_string(),
        created_date: Utc::now().naive_utc(),
    };
    let result = diesel::insert_into(tweet::table)
        .values(&new_tweet)
        .returning(model::Tweet::as_returning())
        .get_result(db)?;
    tracing::info!("User {} posted tweet {}", viewer_id, result.id);

    Ok(util::tweet_view(result, Some(&author), 0, false))
}

#[cfg(test)]
mod test {
    use chirp_core::feed::{FeedFilter, FeedRequest};

    use super::*;
    use crate::feed::fetch_page;
    use crate::test_util::*;

    #[test]
    fn test_create_tweet_tops_the_feed() {
        let db = &mut database();
        add_user(db, "alice");
        add_tweet(db, "old", "alice", 1);

        let tweet = create_tweet(db, "alice", "hello world").unwrap();
        assert_eq!(tweet.content, "hello world");
        assert_eq!(tweet.like_count, 0);
        assert_eq!(tweet.user.id, "alice");

        let page = fetch_page(db, None, &FeedRequest::new(FeedFilter::All, 10)).unwrap();
        assert_eq!(page.tweets[0], tweet);
        assert_eq!(page.tweets[1].id, "old");
    }

    #[test]
    fn test_reject_invalid_content() {
        let db = &mut database();
        add_user(db, "alice");
        assert!(matches!(create_tweet(db, "alice", "  \n"), Err(Error::InvalidRequest(_))));
        let long = "a".repeat(MAX_TWEET_LENGTH + 1);
        assert!(matches!(create_tweet(db, "alice", &long), Err(Error::InvalidRequest(_))));
        let exact = "é".repeat(MAX_TWEET_LENGTH);
        assert!(create_tweet(db, "alice", &exact).is_ok());
    }

    #[test]
    fn test_unknown_author() {
        let db = &mut database();
        assert!(matches!(create_tweet(db, "ghost", "boo"), Err(Error::ObjectNotFound(_))));
    }
}
