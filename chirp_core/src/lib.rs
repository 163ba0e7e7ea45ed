pub mod error;
pub mod feed;
pub mod schema;

pub use error::*;
pub use feed::{Database, FeedSource};
