//! SQLite database module for the Food Court Engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
