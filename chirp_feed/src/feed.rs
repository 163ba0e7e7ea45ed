// Infinite feeds over the tweet table.
// Pages are ordered by creation date and ID, both descending, and resumed by cursor,
// so concurrent inserts never shift a page the way offsets would.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use itertools::Itertools;

use std::collections::{HashMap, HashSet};

use chirp_core::{feed::*, Database, Error, Result};

use crate::{model, util};

/// Fetch one page of a feed on behalf of `viewer`.
///
/// At most `limit` tweets are returned. `next_cursor` points at the last returned tweet,
/// and is only present when more eligible tweets follow it.
pub fn fetch_page(db: Database, viewer: Option<&str>, request: &FeedRequest) -> Result<FeedPage> {
    use chirp_core::schema::{follow, tweet};
    use chirp_util::diesel_ext::LookAhead;

    let page_size = request.page_size();
    if page_size <= 0 {
        return Err(Error::InvalidRequest(format!("Page size must be positive, got {}", page_size)));
    }

    // 1. Restrict eligible tweets by filter
    let mut query: tweet::BoxedQuery<'_, Sqlite> = tweet::table.into_boxed();
    match &request.filter {
        FeedFilter::All => {}
        FeedFilter::Following => {
            let Some(viewer) = viewer else {
                tracing::debug!("Anonymous viewer asked for the following feed");
                return Ok(FeedPage::default());
            };
            let followed = follow::table
                .filter(follow::follower_id.eq(viewer.to_string()))
                .select(follow::following_id);
            query = query.filter(tweet::user_id.eq_any(followed));
        }
        FeedFilter::Profile { user_id } => {
            query = query.filter(tweet::user_id.eq(user_id.clone()));
        }
    }

    // 2. Resume strictly after the cursor
    if let Some(cursor) = &request.cursor {
        let created_date = cursor.created_at.naive_utc();
        query = query.filter(
            tweet::created_date
                .lt(created_date)
                .or(tweet::created_date.eq(created_date).and(tweet::id.lt(cursor.id.clone()))),
        );
    }

    // 3. Load the page with one look-ahead row
    let (tweets, has_more) = query
        .order((tweet::created_date.desc(), tweet::id.desc()))
        .look_ahead(page_size)
        .load_page::<model::Tweet>(db)?;

    let page = assemble_page(db, viewer, tweets, has_more)?;
    tracing::debug!(
        "Fetched {} tweets of feed {} after {}, has more: {}",
        page.tweets.len(),
        request.filter,
        request.cursor.as_ref().map(|c| c.to_string()).unwrap_or_default(),
        page.next_cursor.is_some()
    );
    Ok(page)
}

/// The home feed: every tweet, or only tweets by followed users.
pub fn infinite_feed(
    db: Database,
    viewer: Option<&str>,
    only_following: bool,
    limit: Option<i64>,
    cursor: Option<Cursor>,
) -> Result<FeedPage> {
    let request = FeedRequest {
        filter: if only_following {
            FeedFilter::Following
        } else {
            FeedFilter::All
        },
        limit,
        cursor,
    };
    fetch_page(db, viewer, &request)
}

/// Tweets by one user.
pub fn infinite_profile_feed(
    db: Database,
    viewer: Option<&str>,
    user_id: &str,
    limit: Option<i64>,
    cursor: Option<Cursor>,
) -> Result<FeedPage> {
    let request = FeedRequest {
        filter: FeedFilter::Profile {
            user_id: user_id.to_string(),
        },
        limit,
        cursor,
    };
    fetch_page(db, viewer, &request)
}

/// Attach authors and aggregated likes to loaded tweets.
fn assemble_page(db: Database, viewer: Option<&str>, tweets: Vec<model::Tweet>, has_more: bool) -> Result<FeedPage> {
    use chirp_core::schema::{tweet_like, user};

    if tweets.is_empty() {
        return Ok(FeedPage::default());
    }

    // 1. Fetch associated users
    let user_ids = tweets.iter().map(|t| t.user_id.clone()).unique().collect::<Vec<_>>();
    let users = user::table
        .filter(user::id.eq_any(&user_ids))
        .load::<model::User>(db)?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect::<HashMap<_, _>>();

    // 2. Count likes per tweet
    let tweet_ids = tweets.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
    let like_counts = tweet_like::table
        .filter(tweet_like::tweet_id.eq_any(&tweet_ids))
        .group_by(tweet_like::tweet_id)
        .select((tweet_like::tweet_id, diesel::dsl::count_star()))
        .load::<(String, i64)>(db)?
        .into_iter()
        .collect::<HashMap<_, _>>();

    // 3. Find the viewer's likes
    let liked = match viewer {
        Some(viewer) => tweet_like::table
            .filter(tweet_like::user_id.eq(viewer))
            .filter(tweet_like::tweet_id.eq_any(&tweet_ids))
            .select(tweet_like::tweet_id)
            .load::<String>(db)?
            .into_iter()
            .collect::<HashSet<_>>(),
        None => HashSet::new(),
    };

    let tweets = tweets
        .into_iter()
        .map(|t| {
            let like_count = like_counts.get(&t.id).copied().unwrap_or(0);
            let liked_by_me = liked.contains(&t.id);
            let author = users.get(&t.user_id);
            util::tweet_view(t, author, like_count, liked_by_me)
        })
        .collect::<Vec<_>>();
    let next_cursor = if has_more {
        tweets.last().map(TweetView::cursor)
    } else {
        None
    };
    Ok(FeedPage { tweets, next_cursor })
}
