//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per catalog endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // User Endpoints
    // ========================================================================

    pub async fn create_user(&self, username: &str) -> Response {
        self.client
            .post(format!("{}/users", self.base_url))
            .json(&json!({ "username": username }))
            .send()
            .await
            .expect("Create user request failed")
    }

    /// Creates a user and returns its id
    ///
    /// # Panics
    ///
    /// Panics if the server does not answer with a user body.
    pub async fn create_user_id(&self, username: &str) -> i64 {
        let response = self.create_user(username).await;
        assert!(
            response.status().is_success(),
            "User creation failed with {}",
            response.status()
        );
        let user: Value = response.json().await.expect("Invalid user body");
        user["id"].as_i64().expect("User body without id")
    }

    pub async fn get_user(&self, user_id: i64) -> Response {
        self.client
            .get(format!("{}/users/{}", self.base_url, user_id))
            .send()
            .await
            .expect("Get user request failed")
    }

    pub async fn delete_user(&self, user_id: i64) -> Response {
        self.client
            .delete(format!("{}/users/{}", self.base_url, user_id))
            .send()
            .await
            .expect("Delete user request failed")
    }

    // ========================================================================
    // Album Endpoints
    // ========================================================================

    pub async fn add_album(&self, user_id: i64, album: Value) -> Response {
        self.client
            .post(format!("{}/users/{}/albums", self.base_url, user_id))
            .json(&album)
            .send()
            .await
            .expect("Add album request failed")
    }

    pub async fn list_albums(&self, user_id: i64, query: Option<&str>) -> Response {
        let mut request = self
            .client
            .get(format!("{}/users/{}/albums", self.base_url, user_id));
        if let Some(query) = query {
            request = request.query(&[("q", query)]);
        }
        request.send().await.expect("List albums request failed")
    }

    pub async fn check_album(
        &self,
        user_id: i64,
        title: Option<&str>,
        barcode: Option<&str>,
    ) -> Response {
        let mut params = Vec::new();
        if let Some(title) = title {
            params.push(("title", title));
        }
        if let Some(barcode) = barcode {
            params.push(("barcode", barcode));
        }
        self.client
            .get(format!("{}/users/{}/albums/check", self.base_url, user_id))
            .query(&params)
            .send()
            .await
            .expect("Check album request failed")
    }

    pub async fn update_album(&self, user_id: i64, album_id: i64, update: Value) -> Response {
        self.client
            .put(format!(
                "{}/users/{}/albums/{}",
                self.base_url, user_id, album_id
            ))
            .json(&update)
            .send()
            .await
            .expect("Update album request failed")
    }

    pub async fn delete_album(&self, user_id: i64, album_id: i64) -> Response {
        self.client
            .delete(format!(
                "{}/users/{}/albums/{}",
                self.base_url, user_id, album_id
            ))
            .send()
            .await
            .expect("Delete album request failed")
    }

    // ========================================================================
    // Metadata & Health Endpoints
    // ========================================================================

    pub async fn search_barcode(&self, barcode: &str) -> Response {
        self.client
            .get(format!("{}/api/search/barcode/{}", self.base_url, barcode))
            .send()
            .await
            .expect("Barcode search request failed")
    }

    pub async fn healthz(&self) -> Response {
        self.client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }
}
