pub mod profile;
pub mod tweet;
