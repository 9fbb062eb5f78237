//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, EXPANSE_SHOW_ID};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_show() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::as_user(server.base_url.clone());
//!
//!     let response = client.get_content("show", EXPANSE_SHOW_ID).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;

#[allow(unused_imports)]
pub(crate) use fixtures::create_test_db_dir;
