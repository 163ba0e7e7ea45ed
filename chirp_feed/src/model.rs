use chrono::NaiveDateTime;
use diesel::prelude::*;

use chirp_core::schema::*;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub created_date: NaiveDateTime,
}

/// A user provisioned by the authentication layer.
#[derive(Insertable, Debug, Clone, Default)]
#[diesel(table_name = user)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone)]
#[diesel(table_name = tweet)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tweet {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_date: NaiveDateTime,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone)]
#[diesel(table_name = tweet_like)]
#[diesel(primary_key(user_id, tweet_id))]
#[diesel(belongs_to(Tweet, foreign_key = tweet_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TweetLike {
    pub user_id: String,
    pub tweet_id: String,
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = follow)]
#[diesel(primary_key(follower_id, following_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Follow {
    pub follower_id: String,
    pub following_id: String,
}

#[derive(Queryable, Selectable, Identifiable, Associations, Insertable, Debug, Clone)]
#[diesel(table_name = session)]
#[diesel(primary_key(token))]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires: NaiveDateTime,
}
