use chrono::{Duration, NaiveDate, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

use chirp_core::schema::{follow, session, tweet, tweet_like, user};

use crate::model;

pub fn database() -> SqliteConnection {
    let mut db = SqliteConnection::establish(":memory:").unwrap();
    db.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    crate::setup::ensure_schema(&mut db).unwrap();
    db
}

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

pub fn add_user(db: &mut SqliteConnection, id: &str) {
    diesel::insert_into(user::table)
        .values(model::NewUser {
            id: id.to_string(),
            name: Some(format!("User {}", id)),
            image: Some(format!("https://example.com/{}.png", id)),
            ..Default::default()
        })
        .execute(db)
        .unwrap();
}

/// Insert a tweet created `seconds` after the base time.
pub fn add_tweet(db: &mut SqliteConnection, id: &str, user_id: &str, seconds: i64) {
    diesel::insert_into(tweet::table)
        .values(model::Tweet {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: format!("Tweet {}", id),
            created_date: base_time() + Duration::seconds(seconds),
        })
        .execute(db)
        .unwrap();
}

pub fn add_like(db: &mut SqliteConnection, user_id: &str, tweet_id: &str) {
    diesel::insert_into(tweet_like::table)
        .values(model::TweetLike {
            user_id: user_id.to_string(),
            tweet_id: tweet_id.to_string(),
        })
        .execute(db)
        .unwrap();
}

pub fn add_follow(db: &mut SqliteConnection, follower_id: &str, following_id: &str) {
    diesel::insert_into(follow::table)
        .values(model::Follow {
            follower_id: follower_id.to_string(),
            following_id: following_id.to_string(),
        })
        .execute(db)
        .unwrap();
}

pub fn add_session(db: &mut SqliteConnection, token: &str, user_id: &str, expires: NaiveDateTime) {
    diesel::insert_into(session::table)
        .values(model::Session {
            token: token.to_string(),
            user_id: user_id.to_string(),
            expires,
        })
        .execute(db)
        .unwrap();
}
