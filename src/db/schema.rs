//! Database schema and migrations for Depot.
//!
//! This module contains all database migrations that will be applied
//! sequentially when the database is first opened or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: Initial schema - users table
    r#"
-- Users table for account management
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL COLLATE NOCASE UNIQUE,
    password    TEXT NOT NULL,           -- plaintext credential check
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    last_login  TEXT
);

CREATE INDEX idx_users_username ON users(username);
"#,
    // v2: File records table for ownership and sharing
    r#"
-- File records: one row per stored blob
CREATE TABLE file_records (
    id          TEXT PRIMARY KEY,                 -- stored blob name, '{uuid}.{ext}'
    filename    TEXT NOT NULL,                    -- original upload name
    owner_id    INTEGER NOT NULL REFERENCES users(id),
    shared_to   TEXT NOT NULL DEFAULT '[]',       -- JSON array of user ids
    size        INTEGER NOT NULL,
    file_type   TEXT NOT NULL,
    version     INTEGER NOT NULL DEFAULT 1,       -- bumped on every mutation
    created_at  TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_file_records_owner_id ON file_records(owner_id);
CREATE INDEX idx_file_records_created_at ON file_records(created_at);
"#,
];
