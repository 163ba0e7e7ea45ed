pub mod diesel_ext;
mod parsing;

pub use parsing::*;
