pub mod analytics;
pub mod bookmark;
pub mod error;
pub mod message;
pub mod request;
pub mod user;

#[cfg(test)]
pub mod test_utils;

pub use error::*;
