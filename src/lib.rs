//! Watchlog Server Library
//!
//! This library exposes the internal modules for testing and for the binaries.

pub mod catalog_store;
pub mod config;
pub mod server;
pub mod sqlite_persistence;
pub mod tracking;
pub mod user;

pub use server::{make_app, run_server, RequestsLoggingLevel};
pub use tracking::TrackingManager;
pub use user::{SqliteUserStore, UserStore};
