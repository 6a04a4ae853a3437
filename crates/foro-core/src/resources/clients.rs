//! Client-record resource.

use std::sync::Arc;

use foro_types::{ClientDraft, ClientRecord};
use serde_json::json;

use crate::error::ApiResult;
use crate::http::ApiClient;

/// Typed wrapper over the client-record endpoints.
///
/// Thin pass-throughs with fixed paths and payload shapes; errors
/// propagate to the caller except the universal 401 handling in the HTTP
/// client.
pub struct ClientsApi {
    client: Arc<ApiClient>,
}

impl ClientsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Lists all client records.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn list(&self) -> ApiResult<Vec<ClientRecord>> {
        self.client.get_json("/api/clientes").await
    }

    /// Creates a record from a draft.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn create(&self, draft: &ClientDraft) -> ApiResult<ClientRecord> {
        self.client.post_json("/api/clientes", draft).await
    }

    /// Replaces a record with the draft's full field set.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn update(&self, id: i64, draft: &ClientDraft) -> ApiResult<ClientRecord> {
        self.client
            .put_json(&format!("/api/clientes/{id}"), draft)
            .await
    }

    /// Soft delete: hides the record instead of destroying it.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn delete(&self, id: i64) -> ApiResult<ClientRecord> {
        self.client
            .put_json(&format!("/api/clientes/{id}"), &json!({"visivel": false}))
            .await
    }

    /// Hard delete: removes the record outright.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn hard_delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&format!("/api/clientes/{id}")).await
    }
}
