//! Content traffic reporting: CSV ingestion into SQLite and a filterable
//! terminal dashboard over the loaded table.

pub mod app;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod output;
pub mod query;
pub mod schema;
pub mod store;
pub mod types;
pub mod util;

pub use error::{Error, Result};
