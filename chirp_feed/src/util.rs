use chirp_core::feed::{AuthorView, TweetView};

use crate::model;

impl From<&model::User> for AuthorView {
    fn from(user: &model::User) -> Self {
        AuthorView {
            id: user.id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

/// Assemble the read projection of a stored tweet.
/// If the author is unknown, only the author ID is kept.
pub(crate) fn tweet_view(
    tweet: model::Tweet,
    author: Option<&model::User>,
    like_count: i64,
    liked_by_me: bool,
) -> TweetView {
    let user = author.map(AuthorView::from).unwrap_or_else(|| AuthorView {
        id: tweet.user_id.clone(),
        ..Default::default()
    });
    TweetView {
        id: tweet.id,
        content: tweet.content,
        created_at: tweet.created_date.and_utc(),
        like_count,
        liked_by_me,
        user,
    }
}
