//! Storage Module
//!
//! SQLite-based persistence with:
//! - Versioned schema migrations
//! - Reader/writer connection split behind `&self` methods
//! - Soft-deleted questions that keep their review history

mod migrations;
mod sqlite;

pub use sqlite::{Result, Storage, StorageError};
