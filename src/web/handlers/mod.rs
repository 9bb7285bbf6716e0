//! API handlers for the Web API.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;
