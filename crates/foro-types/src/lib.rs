//! Canonical domain records shared across the foro crates.
//!
//! The backend mixes Portuguese and English field names for the same data.
//! These types fix the canonical shapes and the exact wire spelling; the
//! alias-tolerant normalization of login/profile payloads lives in
//! `foro-core`.

use serde::{Deserialize, Serialize};

/// Signed-in user, normalized from the backend's heterogeneous login and
/// profile payloads.
///
/// Serialized with camelCase keys (`userId`, `photoUrl`); this is the exact
/// shape persisted in the session file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend identifier, normalized to its decimal string form.
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Account role code (e.g. `ADVOGADO`); `user` when the backend omits it.
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// A client record as the backend stores it.
///
/// Wire names are the backend's Portuguese ones. Listings may omit the two
/// flags; a missing `visivel` means the record is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "telefone")]
    pub phone: String,
    /// Whether the client opted into case-progress follow-up.
    #[serde(default, rename = "acompanhamento")]
    pub follow_up: bool,
    /// Soft-delete flag; hidden records keep their data but drop out of
    /// listings.
    #[serde(default = "default_visible", rename = "visivel")]
    pub visible: bool,
}

/// Payload for creating or updating a client record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDraft {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(default, rename = "acompanhamento")]
    pub follow_up: bool,
    #[serde(default = "default_visible", rename = "visivel")]
    pub visible: bool,
}

impl ClientDraft {
    /// Creates a visible draft with follow-up off, the intake-form defaults.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            follow_up: false,
            visible: true,
        }
    }
}

fn default_visible() -> bool {
    true
}

/// Selectable account role offered at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: `UserProfile` serializes with the camelCase wire keys and drops
    /// an absent photo instead of writing `null`.
    #[test]
    fn test_user_profile_wire_keys() {
        let profile = UserProfile {
            user_id: "7".to_string(),
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            role: "ADVOGADO".to_string(),
            photo_url: None,
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["userId"], "7");
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["role"], "ADVOGADO");
        assert!(json.get("photoUrl").is_none());
    }

    /// Test: a payload without `photoUrl` deserializes with `None`.
    #[test]
    fn test_user_profile_missing_photo() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"userId":"7","name":"Ana","email":"a@b.com","role":"user"}"#)
                .unwrap();
        assert_eq!(profile.photo_url, None);
    }

    /// Test: client listings that omit the flags still parse, with
    /// `visivel` defaulting to true and `acompanhamento` to false.
    #[test]
    fn test_client_record_flag_defaults() {
        let record: ClientRecord =
            serde_json::from_str(r#"{"id":3,"nome":"Ana Lima","email":"ana@example.com"}"#)
                .unwrap();
        assert!(record.visible);
        assert!(!record.follow_up);
        assert_eq!(record.phone, "");
    }

    /// Test: drafts serialize with the Portuguese wire names and the
    /// intake-form defaults.
    #[test]
    fn test_client_draft_wire_shape() {
        let draft = ClientDraft::new("Ana Lima", "ana@example.com", "11 99999-0000");

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["nome"], "Ana Lima");
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["telefone"], "11 99999-0000");
        assert_eq!(json["acompanhamento"], false);
        assert_eq!(json["visivel"], true);
    }

    /// Test: role entries map `codigo`/`descricao` onto the canonical fields.
    #[test]
    fn test_role_wire_names() {
        let role: Role =
            serde_json::from_str(r#"{"codigo":"ADVOGADO","descricao":"Advogado(a)"}"#).unwrap();
        assert_eq!(role.code, "ADVOGADO");
        assert_eq!(role.description, "Advogado(a)");
    }
}
