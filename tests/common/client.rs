//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server route. When routes or request
//! formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client acting as one user through the `X-Watchlog-User` header.
pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
    pub user_handle: Option<String>,
}

#[allow(dead_code)]
impl TestClient {
    /// Creates a client that sends no user header.
    pub fn anonymous(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            user_handle: None,
        }
    }

    /// Creates a client acting as [`TEST_USER`].
    pub fn as_user(base_url: String) -> Self {
        Self::as_handle(base_url, TEST_USER)
    }

    /// Creates a client acting as [`OTHER_USER`].
    pub fn as_other_user(base_url: String) -> Self {
        Self::as_handle(base_url, OTHER_USER)
    }

    pub fn as_handle(base_url: String, handle: &str) -> Self {
        let mut client = Self::anonymous(base_url);
        client.user_handle = Some(handle.to_string());
        client
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.user_handle {
            Some(handle) => builder.header("X-Watchlog-User", handle),
            None => builder,
        }
    }

    async fn send(builder: reqwest::RequestBuilder) -> Response {
        builder.send().await.expect("Request failed")
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/")).await
    }

    /// GET /v1/content/{kind}/{id}
    pub async fn get_content(&self, kind: &str, id: i64) -> Response {
        Self::send(self.request(reqwest::Method::GET, &format!("/v1/content/{}/{}", kind, id))).await
    }

    /// PUT /v1/content/{kind}/{id}/watched
    pub async fn set_watched(&self, kind: &str, id: i64, watched: bool) -> Response {
        Self::send(
            self.request(
                reqwest::Method::PUT,
                &format!("/v1/content/{}/{}/watched", kind, id),
            )
            .json(&json!({ "watched": watched })),
        )
        .await
    }

    /// POST /v1/content/{kind}/{id}/annotation
    pub async fn annotate(&self, kind: &str, id: i64, body: Value) -> Response {
        Self::send(
            self.request(
                reqwest::Method::POST,
                &format!("/v1/content/{}/{}/annotation", kind, id),
            )
            .json(&body),
        )
        .await
    }

    /// POST /v1/content/{kind}/{id}/annotation with only a rating
    pub async fn rate(&self, kind: &str, id: i64, rating: f64) -> Response {
        self.annotate(kind, id, json!({ "rating": rating })).await
    }

    /// POST /v1/content/{kind}/{id}/annotation with only a note
    pub async fn note(&self, kind: &str, id: i64, note: &str) -> Response {
        self.annotate(kind, id, json!({ "note": note })).await
    }

    /// GET /v1/content/{kind}/{id}/reviews
    pub async fn get_reviews(&self, kind: &str, id: i64) -> Response {
        Self::send(self.request(
            reqwest::Method::GET,
            &format!("/v1/content/{}/{}/reviews", kind, id),
        ))
        .await
    }

    /// GET /v1/dashboard
    pub async fn get_dashboard(&self, filter: Option<&str>) -> Response {
        let path = match filter {
            Some(filter) => format!("/v1/dashboard?filter={}", filter),
            None => "/v1/dashboard".to_string(),
        };
        Self::send(self.request(reqwest::Method::GET, &path)).await
    }

    /// GET /v1/dashboard with listing options, e.g. `[("kind", "movie")]`
    pub async fn list_content(&self, query: &[(&str, &str)]) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/dashboard").query(query)).await
    }

    /// GET /v1/user/profile
    pub async fn get_profile(&self) -> Response {
        Self::send(self.request(reqwest::Method::GET, "/v1/user/profile")).await
    }

    /// POST /v1/user/notes/export/selected
    pub async fn export_selected(&self, selected: &[(&str, i64)], include_others: bool) -> Response {
        let selected: Vec<Value> = selected
            .iter()
            .map(|(kind, id)| json!({ "kind": kind, "id": id }))
            .collect();
        Self::send(
            self.request(reqwest::Method::POST, "/v1/user/notes/export/selected")
                .json(&json!({ "selected": selected, "include_others": include_others })),
        )
        .await
    }

    /// GET /v1/user/notes/summary
    pub async fn get_export_summary(&self, include_others: bool) -> Response {
        Self::send(
            self.request(reqwest::Method::GET, "/v1/user/notes/summary")
                .query(&[("include_others", include_others.to_string())]),
        )
        .await
    }

    /// GET /v1/user/notes/export
    pub async fn export_notes(&self, format: Option<&str>) -> Response {
        let path = match format {
            Some(format) => format!("/v1/user/notes/export?format={}", format),
            None => "/v1/user/notes/export".to_string(),
        };
        Self::send(self.request(reqwest::Method::GET, &path)).await
    }

    /// GET /v1/user/stats
    pub async fn get_stats(&self, scope: Option<&str>, all_users: bool) -> Response {
        let mut query = vec![("all_users", all_users.to_string())];
        if let Some(scope) = scope {
            query.push(("scope", scope.to_string()));
        }
        Self::send(self.request(reqwest::Method::GET, "/v1/user/stats").query(&query)).await
    }
}
