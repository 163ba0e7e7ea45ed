use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Object `{0}` not found")]
    ObjectNotFound(String),
    #[error("Object `{0}` already exists")]
    ObjectAlreadyExists(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
