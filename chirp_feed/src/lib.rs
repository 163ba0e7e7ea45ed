pub mod feed;
pub mod like;
mod model;
pub mod profile;
pub mod session;
pub mod setup;
mod source;
#[cfg(test)]
mod test_util;
pub mod tweet;
mod util;

pub use model::NewUser;
pub use setup::DatabasePool;
pub use source::*;
