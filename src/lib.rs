//! Depot - self-hosted file depot
//!
//! A small file service with per-file ownership, sharing and ownership
//! transfer, served over a JSON API.

pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{DepotError, Result};
pub use file::{
    decide, Action, FileRecord, FileRecordRepository, FileService, FileStorage, NewFileRecord,
    ShareSet, Verdict,
};
pub use web::WebServer;
