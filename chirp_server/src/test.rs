use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, Request, StatusCode},
    response::Json,
};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel::prelude::*;

use chirp_core::feed::*;
use chirp_feed::{profile, setup::memory_pool, tweet, NewUser};

use crate::error::ServerError;
use crate::payload::ProfileFeedRequest;
use crate::router::{profile as profile_router, tweet as tweet_router};
use crate::state::AppState;
use crate::util::Viewer;

fn app_state() -> AppState {
    AppState {
        pool: memory_pool().unwrap(),
    }
}

fn add_user(state: &AppState, id: &str) {
    let db = &mut state.pool.get().unwrap();
    let new_user = NewUser {
        id: id.to_string(),
        name: Some(id.to_uppercase()),
        ..Default::default()
    };
    profile::add_user(db, &new_user).unwrap();
}

fn add_session(state: &AppState, token: &str, user_id: &str, expires: NaiveDateTime) {
    use chirp_core::schema::session;

    let db = &mut state.pool.get().unwrap();
    diesel::insert_into(session::table)
        .values((
            session::token.eq(token),
            session::user_id.eq(user_id),
            session::expires.eq(expires),
        ))
        .execute(db)
        .unwrap();
}

fn add_tweets(state: &AppState, user_id: &str, count: usize) -> Vec<TweetView> {
    let db = &mut state.pool.get().unwrap();
    (0..count)
        .map(|i| tweet::create_tweet(db, user_id, &format!("Tweet {}", i)).unwrap())
        .collect()
}

fn viewer(id: &str) -> Viewer {
    Viewer(Some(id.to_string()))
}

fn status<T>(result: Result<T, ServerError>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status_code(),
    }
}

async fn extract(state: &AppState, name: header::HeaderName, value: &str) -> Viewer {
    let (mut parts, _) = Request::builder().header(name, value).body(()).unwrap().into_parts();
    Viewer::from_request_parts(&mut parts, state).await.unwrap()
}

#[tokio::test]
async fn test_viewer_from_headers() {
    let state = app_state();
    add_user(&state, "alice");
    let now = Utc::now().naive_utc();
    add_session(&state, "fresh", "alice", now + Duration::days(1));
    add_session(&state, "stale", "alice", now - Duration::days(1));

    let cookie = extract(&state, header::COOKIE, "theme=dark; session_token=fresh").await;
    assert_eq!(cookie, viewer("alice"));
    let bearer = extract(&state, header::AUTHORIZATION, "Bearer fresh").await;
    assert_eq!(bearer, viewer("alice"));
    let expired = extract(&state, header::COOKIE, "session_token=stale").await;
    assert_eq!(expired, Viewer(None));
    let unknown = extract(&state, header::AUTHORIZATION, "Bearer unknown").await;
    assert_eq!(unknown, Viewer(None));
    let other = extract(&state, header::COOKIE, "theme=dark").await;
    assert_eq!(other, Viewer(None));
}

#[tokio::test]
async fn test_feed_pages() {
    let state = app_state();
    add_user(&state, "alice");
    let mut created = add_tweets(&state, "alice", 3);
    created.sort_by(|a, b| (&b.created_at, &b.id).cmp(&(&a.created_at, &a.id)));

    let request = FeedRequest::new(FeedFilter::All, 2);
    let Json(first) = tweet_router::get_feed(State(state.clone()), Viewer(None), Json(request.clone()))
        .await
        .unwrap();
    assert_eq!(first.tweets.len(), 2);
    let cursor = first.next_cursor.clone().unwrap();
    assert_eq!(cursor, first.tweets[1].cursor());

    let request = request.with_cursor(Some(cursor));
    let Json(second) = tweet_router::get_feed(State(state.clone()), Viewer(None), Json(request))
        .await
        .unwrap();
    assert_eq!(second.tweets.len(), 1);
    assert_eq!(second.next_cursor, None);

    let ids = first
        .tweets
        .iter()
        .chain(second.tweets.iter())
        .map(|t| t.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(ids, created.iter().map(|t| t.id.clone()).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_like_needs_viewer() {
    let state = app_state();
    add_user(&state, "alice");
    let tweet_id = add_tweets(&state, "alice", 1)[0].id.clone();

    let anonymous = tweet_router::toggle_like(State(state.clone()), Viewer(None), Path(tweet_id.clone())).await;
    assert_eq!(status(anonymous), StatusCode::UNAUTHORIZED);

    let Json(response) = tweet_router::toggle_like(State(state.clone()), viewer("alice"), Path(tweet_id.clone()))
        .await
        .unwrap();
    assert!(response.added_like);

    let request = FeedRequest::new(FeedFilter::All, 10);
    let Json(page) = tweet_router::get_feed(State(state.clone()), viewer("alice"), Json(request))
        .await
        .unwrap();
    assert_eq!((page.tweets[0].like_count, page.tweets[0].liked_by_me), (1, true));

    let missing = tweet_router::toggle_like(State(state), viewer("alice"), Path("missing".to_string())).await;
    assert_eq!(status(missing), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_tweet() {
    let state = app_state();
    add_user(&state, "alice");

    let request = || NewTweetRequest {
        content: "Hello".to_string(),
    };
    let anonymous = tweet_router::create_tweet(State(state.clone()), Viewer(None), Json(request())).await;
    assert_eq!(status(anonymous), StatusCode::UNAUTHORIZED);

    let Json(tweet) = tweet_router::create_tweet(State(state.clone()), viewer("alice"), Json(request()))
        .await
        .unwrap();
    assert_eq!(tweet.content, "Hello");
    assert_eq!(tweet.user.id, "alice");

    let blank = NewTweetRequest {
        content: "   ".to_string(),
    };
    let blank = tweet_router::create_tweet(State(state), viewer("alice"), Json(blank)).await;
    assert_eq!(status(blank), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_routes() {
    let state = app_state();
    add_user(&state, "alice");
    add_user(&state, "bob");
    add_tweets(&state, "bob", 2);

    let missing = profile_router::get_profile(State(state.clone()), Viewer(None), Path("carol".to_string())).await;
    assert_eq!(status(missing), StatusCode::NOT_FOUND);

    let own = profile_router::toggle_follow(State(state.clone()), viewer("alice"), Path("alice".to_string())).await;
    assert_eq!(status(own), StatusCode::BAD_REQUEST);

    let Json(response) = profile_router::toggle_follow(State(state.clone()), viewer("alice"), Path("bob".to_string()))
        .await
        .unwrap();
    assert!(response.added_follow);

    let Json(bob) = profile_router::get_profile(State(state.clone()), viewer("alice"), Path("bob".to_string()))
        .await
        .unwrap();
    assert_eq!((bob.tweets_count, bob.followers_count, bob.is_following), (2, 1, true));

    let request = ProfileFeedRequest {
        limit: Some(1),
        cursor: None,
    };
    let Json(page) =
        profile_router::get_profile_feed(State(state.clone()), Viewer(None), Path("bob".to_string()), Json(request))
            .await
            .unwrap();
    assert_eq!(page.tweets.len(), 1);
    assert!(page.next_cursor.is_some());

    let request = FeedRequest::new(FeedFilter::Following, 10);
    let Json(following) = tweet_router::get_feed(State(state), viewer("alice"), Json(request))
        .await
        .unwrap();
    assert_eq!(following.tweets.len(), 2);
}

#[test]
fn test_error_status_codes() {
    use chirp_core::Error as ChirpError;

    let code = |e: ChirpError| ServerError::from(e).status_code();
    assert_eq!(code(ChirpError::ObjectNotFound("Tweet x".to_string())), StatusCode::NOT_FOUND);
    assert_eq!(
        code(ChirpError::ObjectAlreadyExists("Like of tweet x by user alice".to_string())),
        StatusCode::CONFLICT
    );
    assert_eq!(code(ChirpError::NotLoggedIn("Liking".to_string())), StatusCode::UNAUTHORIZED);
    assert_eq!(code(ChirpError::InvalidRequest("Empty".to_string())), StatusCode::BAD_REQUEST);
    assert_eq!(
        code(ChirpError::DatabaseError(diesel::result::Error::NotFound)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
