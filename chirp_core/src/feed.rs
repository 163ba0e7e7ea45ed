// The shared feed vocabulary of Chirp.
// Views, requests and the abstract source that both the server-side query
// service and the client-side cache speak.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type Database<'a> = &'a mut diesel::SqliteConnection;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;
pub const MAX_TWEET_LENGTH: usize = 280;

// MARK: Traits

/// A feed source is anything that can serve pages of tweets and toggle likes
/// on behalf of a viewer, like the local database or a remote Chirp server.
/// The viewer identity is bound to the source itself, not passed per call.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of the feed described by `request`.
    async fn fetch_page(&self, request: &FeedRequest) -> Result<FeedPage>;

    /// Toggle the viewer's like on a tweet.
    async fn toggle_like(&self, tweet_id: &str) -> Result<ToggleLikeResponse>;
}

// MARK: Entities

/// Which tweets are eligible for a feed. Filters never change the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedFilter {
    /// Every tweet.
    #[default]
    All,
    /// Tweets by users the viewer follows.
    Following,
    /// Tweets by one user.
    Profile { user_id: String },
}

impl std::fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedFilter::All => write!(f, "all"),
            FeedFilter::Following => write!(f, "following"),
            FeedFilter::Profile { user_id } => write!(f, "profile {}", user_id),
        }
    }
}

/// Position of the last tweet of a returned page.
/// Feeds are ordered by `(created_at, id)` descending, so the pair is unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.created_at.to_rfc3339())
    }
}

/// Request for one page of a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRequest {
    #[serde(default)]
    pub filter: FeedFilter,
    /// Page size. `DEFAULT_PAGE_SIZE` if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Cursor>,
}

impl FeedRequest {
    pub fn new(filter: FeedFilter, limit: i64) -> Self {
        Self {
            filter,
            limit: Some(limit),
            cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    /// The effective page size, clamped to `MAX_PAGE_SIZE`.
    pub fn page_size(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}

/// App response of a tweet author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
}

/// App response of a tweet, with likes aggregated for the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Number of likes, counted from like records on every read.
    pub like_count: i64,
    /// Whether the viewer likes this tweet. Always false for anonymous viewers.
    pub liked_by_me: bool,
    pub user: AuthorView,
}

impl TweetView {
    pub fn cursor(&self) -> Cursor {
        Cursor {
            id: self.id.clone(),
            created_at: self.created_at,
        }
    }
}

/// One page of a feed. `next_cursor` is absent when the feed reached its end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub tweets: Vec<TweetView>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next_cursor: Option<Cursor>,
}

/// App response of a user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub tweets_count: i64,
    pub followers_count: i64,
    pub follows_count: i64,
    pub is_following: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTweetRequest {
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleLikeResponse {
    pub added_like: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleFollowResponse {
    pub added_follow: bool,
}
