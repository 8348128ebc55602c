//! SQLite backend for the Doakan engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
