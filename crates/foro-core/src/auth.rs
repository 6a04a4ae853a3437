//! Credential exchange and the auxiliary account flows.
//!
//! The backend answers login with several shapes: the token under `token`
//! or `accessToken`, the profile nested under `user`/`usuario` or spread
//! over the top level, field names in English or Portuguese. Normalization
//! happens once here; everything downstream speaks the canonical
//! `UserProfile`.

use std::sync::Arc;

use foro_types::{Role, UserProfile};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, ApiErrorKind, ApiResult};
use crate::http::ApiClient;

/// Login credentials; transient, never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Account details submitted at registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    senha: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    nome: &'a str,
    email: &'a str,
    senha: &'a str,
    cargo: &'a str,
}

/// Roles the backend keeps for itself; never offered at registration.
const INTERNAL_ROLES: &[&str] = &["DESENVOLVEDOR"];

/// Exchanges credentials for a session and runs the account flows.
pub struct AuthGateway {
    client: Arc<ApiClient>,
}

impl AuthGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Logs in and persists the normalized session.
    ///
    /// A 2xx response without a usable token counts as rejected
    /// credentials, not a malfunction. No retry is attempted; that is the
    /// caller's call.
    ///
    /// # Errors
    /// `InvalidCredentials` on rejection, `Connection`/`Timeout` on
    /// transport failure, `MalformedRequest` when the backend refuses the
    /// payload.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<UserProfile> {
        let request = LoginRequest {
            email: &credentials.email,
            senha: &credentials.password,
        };
        let body: Value = match self.client.post_json("/api/auth/login", &request).await {
            Ok(body) => body,
            // A 2xx with an undecodable body has no token in it either.
            Err(err) if err.kind == ApiErrorKind::Parse => {
                return Err(ApiError::invalid_credentials(""));
            }
            Err(err) => return Err(err),
        };

        let Some(token) = extract_token(&body) else {
            warn!("Login answered 2xx without a token");
            return Err(ApiError::invalid_credentials(&body.to_string()));
        };
        let profile = normalize_profile(&body);

        self.client.store().save(&token, &profile);
        debug!("Session established");
        Ok(profile)
    }

    /// Signs out: best-effort server notification, then the local session
    /// is always dropped.
    pub async fn logout(&self) {
        if let Err(err) = self.client.post_empty("/api/auth/logout").await {
            debug!("Logout call failed ({}); clearing locally", err.kind);
        }
        self.client.store().clear();
    }

    /// Asks the backend whether the current token is still accepted.
    ///
    /// Any failure, transport included, reads as not valid; this never
    /// errors.
    pub async fn validate(&self) -> bool {
        match self.client.get_json::<Value>("/api/auth/validate").await {
            Ok(body) => body.get("valid").and_then(Value::as_bool).unwrap_or(false),
            Err(err) => {
                debug!("Token validation failed ({})", err.kind);
                false
            }
        }
    }

    /// Creates an account. The new user still logs in afterward; no
    /// session is established here.
    ///
    /// # Errors
    /// `MalformedRequest` with the backend message on validation failures
    /// (duplicate email and the like).
    pub async fn register(&self, registration: &Registration) -> ApiResult<()> {
        self.client
            .post_json_discard(
                "/api/usuarios/registrar",
                &RegisterRequest {
                    nome: &registration.name,
                    email: &registration.email,
                    senha: &registration.password,
                    cargo: &registration.role,
                },
            )
            .await
    }

    /// Roles offered at registration, with backend-internal ones filtered
    /// out.
    ///
    /// # Errors
    /// Propagates transport and status failures from the listing call.
    pub async fn roles(&self) -> ApiResult<Vec<Role>> {
        let roles: Vec<Role> = self.client.get_json("/api/listar-cargos").await?;
        Ok(roles
            .into_iter()
            .filter(|role| !INTERNAL_ROLES.contains(&role.code.as_str()))
            .collect())
    }
}

/// Pulls the token out of a login payload.
///
/// Tries `token` then `accessToken`; blank and non-string values fall
/// through like absent ones.
fn extract_token(body: &Value) -> Option<String> {
    ["token", "accessToken"].iter().find_map(|key| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
    })
}

/// Normalizes a login or profile payload into the canonical record.
///
/// The profile may sit under `user` or `usuario`, or spread over the top
/// level; ids arrive numeric or string and come out decimal strings; a
/// missing role means a plain `user`.
pub(crate) fn normalize_profile(body: &Value) -> UserProfile {
    let source = body
        .get("user")
        .or_else(|| body.get("usuario"))
        .unwrap_or(body);

    UserProfile {
        user_id: string_field(source, &["id", "userId"]).unwrap_or_default(),
        name: string_field(source, &["name", "nome"]).unwrap_or_default(),
        email: string_field(source, &["email"]).unwrap_or_default(),
        role: string_field(source, &["role", "cargo"]).unwrap_or_else(|| "user".to_string()),
        photo_url: string_field(source, &["photoUrl", "fotoUrl"]),
    }
}

/// First present key as a string; numbers are rendered decimal, blank
/// strings count as absent.
fn string_field(source: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match source.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Test: the `accessToken` alias is honored when `token` is absent or
    /// blank.
    #[test]
    fn test_extract_token_aliases() {
        assert_eq!(
            extract_token(&json!({"token": "t1"})).as_deref(),
            Some("t1")
        );
        assert_eq!(
            extract_token(&json!({"accessToken": "t2"})).as_deref(),
            Some("t2")
        );
        assert_eq!(
            extract_token(&json!({"token": "", "accessToken": "t3"})).as_deref(),
            Some("t3")
        );
        assert_eq!(extract_token(&json!({"token": "  "})), None);
        assert_eq!(extract_token(&json!({"success": true})), None);
    }

    /// Test: top-level Portuguese fields normalize to the canonical shape.
    #[test]
    fn test_normalize_top_level_portuguese() {
        let profile = normalize_profile(&json!({
            "token": "t1",
            "id": 7,
            "nome": "Ana",
            "email": "a@b.com",
            "cargo": "ADVOGADO"
        }));

        assert_eq!(profile.user_id, "7");
        assert_eq!(profile.name, "Ana");
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.role, "ADVOGADO");
        assert_eq!(profile.photo_url, None);
    }

    /// Test: a profile nested under `user` wins over top-level fields.
    #[test]
    fn test_normalize_nested_user() {
        let profile = normalize_profile(&json!({
            "token": "t1",
            "user": {"userId": "42", "name": "Bruno", "email": "b@c.com", "role": "ESTAGIARIO"}
        }));

        assert_eq!(profile.user_id, "42");
        assert_eq!(profile.name, "Bruno");
        assert_eq!(profile.role, "ESTAGIARIO");
    }

    /// Test: the `usuario` nesting and `fotoUrl` alias are honored.
    #[test]
    fn test_normalize_nested_usuario() {
        let profile = normalize_profile(&json!({
            "usuario": {"id": "9", "nome": "Clara", "email": "c@d.com", "fotoUrl": "/fotos/9.png"}
        }));

        assert_eq!(profile.user_id, "9");
        assert_eq!(profile.photo_url.as_deref(), Some("/fotos/9.png"));
    }

    /// Test: a missing role defaults to `user`.
    #[test]
    fn test_normalize_missing_role_defaults() {
        let profile = normalize_profile(&json!({"id": 1, "nome": "Davi", "email": "d@e.com"}));
        assert_eq!(profile.role, "user");
    }

    /// Test: numeric ids come out as decimal strings.
    #[test]
    fn test_normalize_numeric_id() {
        let profile = normalize_profile(&json!({"id": 1204, "name": "Eva", "email": "e@f.com"}));
        assert_eq!(profile.user_id, "1204");
    }
}
