//! Web API module for Depot.
//!
//! This module provides the JSON API for the file depot: registration and
//! login, file upload and download, sharing and ownership transfer.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
