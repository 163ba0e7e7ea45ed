// Client-side cache of infinite feeds.
// Each mounted view owns one entry keyed by its query; entries collect pages as the
// view scrolls and are patched in place when the viewer toggles a like.

use tokio::sync::RwLock;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chirp_core::feed::*;
use chirp_core::{FeedSource, Result};

/// Identity of a cached feed. Views asking for the same filter and page size share pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub filter: FeedFilter,
    pub limit: i64,
}

impl QueryKey {
    pub fn new(filter: FeedFilter, limit: i64) -> Self {
        Self { filter, limit }
    }

    fn request(&self, cursor: Option<Cursor>) -> FeedRequest {
        FeedRequest::new(self.filter.clone(), self.limit).with_cursor(cursor)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.filter, self.limit)
    }
}

/// What a feed view should render. Exactly one applies at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing cached yet, the first page is on its way.
    Loading,
    /// The last request failed.
    Error(String),
    /// Loaded, but the feed has no tweets.
    Empty,
    Populated { tweets: Vec<TweetView>, has_more: bool },
}

#[derive(Debug, Default)]
struct FeedEntry {
    pages: Vec<FeedPage>,
    in_flight: bool,
    error: Option<String>,
    /// Distinguishes remounts, so a fetch started before an unmount never lands in a later entry.
    generation: u64,
}

impl FeedEntry {
    /// A fresh entry has more to load: its first page.
    fn has_more(&self) -> bool {
        self.pages.last().map_or(true, |p| p.next_cursor.is_some())
    }

    fn next_cursor(&self) -> Option<Cursor> {
        self.pages.last().and_then(|p| p.next_cursor.clone())
    }

    fn tweets(&self) -> impl Iterator<Item = &TweetView> {
        self.pages.iter().flat_map(|p| p.tweets.iter())
    }

    fn status(&self) -> FeedStatus {
        if let Some(error) = &self.error {
            return FeedStatus::Error(error.clone());
        }
        if self.pages.is_empty() {
            return FeedStatus::Loading;
        }
        let tweets = self.tweets().cloned().collect::<Vec<_>>();
        if tweets.is_empty() {
            FeedStatus::Empty
        } else {
            FeedStatus::Populated {
                tweets,
                has_more: self.has_more(),
            }
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<QueryKey, FeedEntry>,
    /// Tweets with a like toggle awaiting the source.
    pending_likes: HashSet<String>,
    next_generation: u64,
}

/// A cached copy of a tweet as it looked before a like toggle.
#[derive(Debug, Clone)]
struct LikeSnapshot {
    key: QueryKey,
    generation: u64,
    page: usize,
    index: usize,
    like_count: i64,
    liked_by_me: bool,
}

impl CacheState {
    /// The cached like state of a tweet, from the first copy found.
    fn liked_by_me(&self, tweet_id: &str) -> Option<bool> {
        self.entries
            .values()
            .flat_map(|e| e.tweets())
            .find(|t| t.id == tweet_id)
            .map(|t| t.liked_by_me)
    }

    fn patch_like(&mut self, tweet_id: &str, added_like: bool) -> usize {
        let mut patched = 0;
        let tweets = self
            .entries
            .values_mut()
            .flat_map(|e| e.pages.iter_mut())
            .flat_map(|p| p.tweets.iter_mut())
            .filter(|t| t.id == tweet_id);
        for tweet in tweets {
            shift_like(tweet, added_like);
            patched += 1;
        }
        patched
    }

    fn snapshot_likes(&self, tweet_id: &str) -> Vec<LikeSnapshot> {
        let mut snapshots = Vec::new();
        for (key, entry) in &self.entries {
            for (page, p) in entry.pages.iter().enumerate() {
                for (index, tweet) in p.tweets.iter().enumerate() {
                    if tweet.id == tweet_id {
                        snapshots.push(LikeSnapshot {
                            key: key.clone(),
                            generation: entry.generation,
                            page,
                            index,
                            like_count: tweet.like_count,
                            liked_by_me: tweet.liked_by_me,
                        });
                    }
                }
            }
        }
        snapshots
    }

    /// The copy a snapshot was taken from, unless its entry was unmounted since.
    fn snapshot_copy(&mut self, snapshot: &LikeSnapshot) -> Option<&mut TweetView> {
        self.entries
            .get_mut(&snapshot.key)
            .filter(|e| e.generation == snapshot.generation)
            .and_then(|e| e.pages.get_mut(snapshot.page))
            .and_then(|p| p.tweets.get_mut(snapshot.index))
    }

    /// Put snapshotted copies back to their pre-toggle state.
    fn restore_likes(&mut self, snapshots: &[LikeSnapshot]) {
        for snapshot in snapshots {
            if let Some(tweet) = self.snapshot_copy(snapshot) {
                tweet.like_count = snapshot.like_count;
                tweet.liked_by_me = snapshot.liked_by_me;
            }
        }
    }

    /// Bring every copy of a tweet in line with a confirmed toggle.
    ///
    /// Snapshotted copies are derived from their pre-toggle state. Copies loaded while the
    /// toggle was pending only move if their like state still differs.
    fn settle_like(&mut self, tweet_id: &str, snapshots: &[LikeSnapshot], added_like: bool) {
        self.restore_likes(snapshots);
        let tweets = self
            .entries
            .values_mut()
            .flat_map(|e| e.pages.iter_mut())
            .flat_map(|p| p.tweets.iter_mut())
            .filter(|t| t.id == tweet_id && t.liked_by_me != added_like);
        for tweet in tweets {
            shift_like(tweet, added_like);
        }
    }
}

fn shift_like(tweet: &mut TweetView, added_like: bool) {
    tweet.like_count = if added_like {
        tweet.like_count + 1
    } else {
        (tweet.like_count - 1).max(0)
    };
    tweet.liked_by_me = added_like;
}

/// Pages of feeds fetched from a source, shared by all views of one client.
#[derive(Debug)]
pub struct FeedCache<S> {
    source: S,
    state: Arc<RwLock<CacheState>>,
}

impl<S: FeedSource> FeedCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Arc::new(RwLock::new(CacheState::default())),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Create the entry of a view. Mounting an existing key keeps its pages.
    pub async fn mount(&self, key: &QueryKey) {
        let mut state = self.state.write().await;
        if state.entries.contains_key(key) {
            return;
        }
        state.next_generation += 1;
        let generation = state.next_generation;
        state.entries.insert(
            key.clone(),
            FeedEntry {
                generation,
                ..Default::default()
            },
        );
        tracing::debug!("Mounted feed {}", key);
    }

    /// Drop the entry of a view with all its pages. Returns false if it wasn't mounted.
    pub async fn unmount(&self, key: &QueryKey) -> bool {
        let removed = self.state.write().await.entries.remove(key).is_some();
        if removed {
            tracing::debug!("Unmounted feed {}", key);
        }
        removed
    }

    /// Append a page fetched elsewhere, like one prefetched by the server.
    /// Mounts the entry if needed.
    pub async fn append_page(&self, key: &QueryKey, page: FeedPage) {
        self.mount(key).await;
        let mut state = self.state.write().await;
        if let Some(entry) = state.entries.get_mut(key) {
            entry.pages.push(page);
            entry.error = None;
        }
    }

    /// Load the next page of a mounted feed.
    ///
    /// Returns `Ok(false)` without touching the source if the feed is not mounted,
    /// reached its end, or already has a fetch in flight. Safe to call on every scroll event.
    pub async fn fetch_more(&self, key: &QueryKey) -> Result<bool> {
        // 1. Claim the entry
        let (request, generation) = {
            let mut state = self.state.write().await;
            let Some(entry) = state.entries.get_mut(key) else {
                tracing::debug!("Feed {} is not mounted", key);
                return Ok(false);
            };
            if entry.in_flight || !entry.has_more() {
                return Ok(false);
            }
            entry.in_flight = true;
            entry.error = None;
            (key.request(entry.next_cursor()), entry.generation)
        };

        // 2. Fetch without holding the lock
        let result = self.source.fetch_page(&request).await;

        // 3. Settle into the same entry, if it is still mounted
        let mut state = self.state.write().await;
        let entry = match state.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => entry,
            _ => {
                tracing::debug!("Feed {} was unmounted during fetch", key);
                return result.map(|_| false);
            }
        };
        entry.in_flight = false;
        match result {
            Ok(page) => {
                tracing::debug!("Feed {} received {} tweets", key, page.tweets.len());
                entry.pages.push(page);
                Ok(true)
            }
            Err(e) => {
                tracing::error!("Feed {} failed to fetch: {}", key, e);
                entry.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Apply a confirmed like toggle to every cached copy of the tweet.
    /// Returns how many copies were patched; other tweets are left untouched.
    pub async fn patch_like(&self, tweet_id: &str, added_like: bool) -> usize {
        self.state.write().await.patch_like(tweet_id, added_like)
    }

    /// Toggle a like optimistically.
    ///
    /// The cached copies flip right away, then the source is asked. A success settles every
    /// copy on the confirmed state, including copies loaded in the meantime. A failure puts
    /// the flipped copies back as they were and returns the error.
    /// Returns `Ok(None)` if a toggle of the same tweet is still pending.
    pub async fn toggle_like(&self, tweet_id: &str) -> Result<Option<bool>> {
        // 1. Tentative patch
        let snapshots = {
            let mut state = self.state.write().await;
            if !state.pending_likes.insert(tweet_id.to_string()) {
                return Ok(None);
            }
            let snapshots = state.snapshot_likes(tweet_id);
            if let Some(liked) = state.liked_by_me(tweet_id) {
                state.patch_like(tweet_id, !liked);
            }
            snapshots
        };

        // 2. Confirm or roll back
        let result = self.source.toggle_like(tweet_id).await;
        let mut state = self.state.write().await;
        state.pending_likes.remove(tweet_id);
        match result {
            Ok(response) => {
                state.settle_like(tweet_id, &snapshots, response.added_like);
                Ok(Some(response.added_like))
            }
            Err(e) => {
                state.restore_likes(&snapshots);
                tracing::error!("Failed to toggle like of tweet {}: {}", tweet_id, e);
                Err(e)
            }
        }
    }

    /// Whether a like toggle of the tweet awaits the source. Views disable the control meanwhile.
    pub async fn is_pending(&self, tweet_id: &str) -> bool {
        self.state.read().await.pending_likes.contains(tweet_id)
    }

    pub async fn status(&self, key: &QueryKey) -> FeedStatus {
        match self.state.read().await.entries.get(key) {
            Some(entry) => entry.status(),
            None => FeedStatus::Loading,
        }
    }

    pub async fn has_more(&self, key: &QueryKey) -> bool {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map_or(false, |e| e.has_more())
    }

    /// All cached tweets of a feed, pages concatenated in order.
    pub async fn tweets(&self, key: &QueryKey) -> Vec<TweetView> {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|e| e.tweets().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn pages(&self, key: &QueryKey) -> Vec<FeedPage> {
        self.state
            .read()
            .await
            .entries
            .get(key)
            .map(|e| e.pages.clone())
            .unwrap_or_default()
    }
}
