//! User account resource.
//!
//! Profile edits also refresh the persisted session so a reload shows the
//! saved state; edits targeting another user never touch the store.

use std::sync::Arc;

use bytes::Bytes;
use foro_types::UserProfile;
use serde::Serialize;
use serde_json::Value;

use crate::auth::normalize_profile;
use crate::error::{ApiError, ApiErrorKind, ApiResult};
use crate::http::ApiClient;

/// Fields editable from the profile page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
struct PasswordChange<'a> {
    #[serde(rename = "senhaAtual")]
    current: &'a str,
    #[serde(rename = "novaSenha")]
    new: &'a str,
}

/// Typed wrapper over the user endpoints.
pub struct UsersApi {
    client: Arc<ApiClient>,
}

impl UsersApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetches the signed-in user's profile, normalized like a login
    /// payload.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn profile(&self) -> ApiResult<UserProfile> {
        let body: Value = self.client.get_json("/api/usuarios/perfil").await?;
        Ok(normalize_profile(&body))
    }

    /// Saves name and email, then merges them into the stored profile when
    /// the edit targets the signed-in user.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn update(&self, user_id: &str, update: &ProfileUpdate) -> ApiResult<()> {
        self.client
            .put_json_discard(&format!("/api/usuarios/{user_id}"), update)
            .await?;

        let store = self.client.store();
        if let Some(session) = store.read()
            && session.profile.user_id == user_id
        {
            let mut profile = session.profile;
            profile.name = update.name.clone();
            profile.email = update.email.clone();
            store.update_profile(&profile);
        }
        Ok(())
    }

    /// Uploads a new profile photo and returns its URL.
    ///
    /// The form carries a single file part named `foto`. The stored
    /// profile picks up the returned URL when the upload targets the
    /// signed-in user.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn update_photo(
        &self,
        user_id: &str,
        filename: &str,
        bytes: Vec<u8>,
        mime_type: Option<&str>,
    ) -> ApiResult<String> {
        let mut part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        if let Some(mime) = mime_type
            && !mime.trim().is_empty()
        {
            part = part.mime_str(mime).map_err(|e| {
                ApiError::new(
                    ApiErrorKind::MalformedRequest,
                    format!("Invalid photo MIME type: {e}"),
                )
            })?;
        }
        let form = reqwest::multipart::Form::new().part("foto", part);

        let body: Value = self
            .client
            .patch_multipart(&format!("/api/usuarios/{user_id}/foto"), form)
            .await?;
        let photo_url = body
            .get("fotoUrl")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let store = self.client.store();
        if !photo_url.is_empty()
            && let Some(session) = store.read()
            && session.profile.user_id == user_id
        {
            let mut profile = session.profile;
            profile.photo_url = Some(photo_url.clone());
            store.update_profile(&profile);
        }

        Ok(photo_url)
    }

    /// Downloads a user's profile photo.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn photo(&self, user_id: &str) -> ApiResult<Bytes> {
        self.client
            .get_bytes(&format!("/api/usuarios/{user_id}/foto"))
            .await
    }

    /// Changes the account password.
    ///
    /// # Errors
    /// Returns an error if the operation fails; a wrong current password
    /// surfaces as the backend's validation message.
    pub async fn change_password(&self, user_id: &str, current: &str, new: &str) -> ApiResult<()> {
        self.client
            .patch_json_discard(
                &format!("/api/usuarios/{user_id}/senha"),
                &PasswordChange { current, new },
            )
            .await
    }

    /// Backend-defined usage statistics; the shape is the backend's to
    /// evolve, so it stays raw JSON.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn stats(&self) -> ApiResult<Value> {
        self.client.get_json("/api/usuarios/estatisticas").await
    }
}
