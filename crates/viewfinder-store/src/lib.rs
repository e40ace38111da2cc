//! # viewfinder-store
//!
//! Local SQLite persistence for the Viewfinder photo site.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for the photo
//! gallery. Migrations run automatically on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod photos;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
