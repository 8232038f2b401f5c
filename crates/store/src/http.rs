//! REST implementation of [`ListingStore`] for the parking backend.
//!
//! | Operation                        | Request                                              |
//! |----------------------------------|------------------------------------------------------|
//! | `list_direct_listings`           | `GET /parking/parkings/`                             |
//! | `list_pending_listings`          | `GET /parking/admin/pending-parkings/`               |
//! | `list_approved_listings`         | `GET /parking/admin/approved-parkings/`              |
//! | `list_pending_approval_requests` | `GET /parking/approval/requests/pendientes/`         |
//! | `approve_listing`                | `POST /parking/parkings/{id}/approve/`               |
//! | `reject_listing`                 | `POST /parking/parkings/{id}/reject/`                |
//! | `delete_listing`                 | `DELETE /parking/parkings/{id}/`                     |
//! | `toggle_activation`              | `POST /parking/parkings/{id}/toggle_activation/`     |
//! | `patch_listing_fields`           | `PATCH /parking/parkings/{id}/`                      |
//! | `approve_request`                | `POST /parking/approval/requests/{id}/aprobar/`      |
//! | `reject_request`                 | `POST /parking/approval/requests/{id}/rechazar/`     |

use serde::de::DeserializeOwned;

use parkctl_core::record::{decode_records, ApprovalRequestRecord, ListingRecord};
use parkctl_core::types::DbId;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{FieldPatch, ListingStore};

/// HTTP client for the parking backend.
#[derive(Debug, Clone)]
pub struct HttpListingStore {
    client: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

impl HttpListingStore {
    /// Build a store with its own client, honouring the configured timeout.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Build a store reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &StoreConfig) -> Self {
        Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn fetch_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, StoreError> {
        let response = self.request(reqwest::Method::GET, path).send().await?;
        let response = Self::ensure_success(response).await?;
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let records = decode_records(payload, path).map_err(|e| StoreError::Decode(e.to_string()))?;
        tracing::debug!(path, count = records.len(), "Fetched listing records");
        Ok(records)
    }

    async fn send_action(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let mut builder = self.request(method, path);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let response = builder.send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Turn a non-2xx response into [`StoreError::Api`], pulling the
    /// backend's `detail` or `error` message out of the body when present.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

/// `detail`, then `error`, then the raw body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["detail", "error"] {
            match map.get(key) {
                Some(serde_json::Value::String(s)) => return Some(s.clone()),
                Some(other) if !other.is_null() => return Some(other.to_string()),
                _ => {}
            }
        }
    }
    Some(trimmed.to_string())
}

impl ListingStore for HttpListingStore {
    async fn list_direct_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.fetch_list("/parking/parkings/").await
    }

    async fn list_pending_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.fetch_list("/parking/admin/pending-parkings/").await
    }

    async fn list_approved_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.fetch_list("/parking/admin/approved-parkings/").await
    }

    async fn list_pending_approval_requests(&self) -> Result<Vec<ApprovalRequestRecord>, StoreError> {
        self.fetch_list("/parking/approval/requests/pendientes/").await
    }

    async fn approve_listing(&self, id: DbId) -> Result<(), StoreError> {
        let path = format!("/parking/parkings/{id}/approve/");
        self.send_action(reqwest::Method::POST, &path, None).await
    }

    async fn reject_listing(&self, id: DbId) -> Result<(), StoreError> {
        let path = format!("/parking/parkings/{id}/reject/");
        self.send_action(reqwest::Method::POST, &path, None).await
    }

    async fn delete_listing(&self, id: DbId) -> Result<(), StoreError> {
        let path = format!("/parking/parkings/{id}/");
        self.send_action(reqwest::Method::DELETE, &path, None).await
    }

    async fn toggle_activation(&self, id: DbId) -> Result<(), StoreError> {
        let path = format!("/parking/parkings/{id}/toggle_activation/");
        self.send_action(reqwest::Method::POST, &path, None).await
    }

    async fn patch_listing_fields(&self, id: DbId, fields: &FieldPatch) -> Result<(), StoreError> {
        let path = format!("/parking/parkings/{id}/");
        let body = serde_json::to_value(fields).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.send_action(reqwest::Method::PATCH, &path, Some(body)).await
    }

    async fn approve_request(&self, request_id: DbId) -> Result<(), StoreError> {
        let path = format!("/parking/approval/requests/{request_id}/aprobar/");
        self.send_action(reqwest::Method::POST, &path, None).await
    }

    async fn reject_request(&self, request_id: DbId, reason: &str) -> Result<(), StoreError> {
        let path = format!("/parking/approval/requests/{request_id}/rechazar/");
        let body = serde_json::json!({ "motivo": reason });
        self.send_action(reqwest::Method::POST, &path, Some(body)).await
    }
}
