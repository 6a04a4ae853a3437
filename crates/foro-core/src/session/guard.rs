//! Per-page session gate.
//!
//! Every protected page runs one check at mount: a usable session renders
//! the page, anything else redirects to the login entry point carrying the
//! originating path.

use crate::session::store::{SessionStore, StoredSession};

/// Entry point visitors are sent to when no session is present.
pub const LOGIN_PATH: &str = "/login";

/// Resolution of a page-mount session check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Store not consulted yet; nothing renders in this state.
    Checking,
    /// A well-formed session is present; the page may render and call the
    /// backend.
    Authenticated(StoredSession),
    /// No usable session; `redirect` is the login URL with the originating
    /// path so login can send the visitor back afterward.
    Unauthenticated { redirect: String },
}

/// Gates a protected page on the presence of a stored session.
///
/// One guard per page instance; the check runs once at mount and does not
/// poll. A session invalidated later is caught reactively by the HTTP
/// client's 401 interceptor.
#[derive(Debug)]
pub struct SessionGuard {
    store: SessionStore,
    state: SessionState,
}

impl SessionGuard {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            state: SessionState::Checking,
        }
    }

    /// Current state; `Checking` until `resolve` has run.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs the mount-time check, transitioning out of `Checking`.
    ///
    /// A corrupt stored profile counts as signed out; the store clears it
    /// internally and the guard redirects like any other missing session.
    pub fn resolve(&mut self, current_path: &str) -> &SessionState {
        self.state = match self.store.read() {
            Some(session) => SessionState::Authenticated(session),
            None => SessionState::Unauthenticated {
                redirect: login_redirect(current_path),
            },
        };
        &self.state
    }
}

/// Builds the login URL carrying the originating path.
pub fn login_redirect(from: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("from", from)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use foro_types::UserProfile;

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at(dir.path().join("session.json"));
        (dir, store)
    }

    fn sample_profile() -> UserProfile {
        UserProfile {
            user_id: "7".to_string(),
            name: "Ana".to_string(),
            email: "a@b.com".to_string(),
            role: "ADVOGADO".to_string(),
            photo_url: None,
        }
    }

    /// Test: the guard starts in `Checking` before the store is consulted.
    #[test]
    fn test_guard_starts_checking() {
        let (_dir, store) = temp_store();
        let guard = SessionGuard::new(store);
        assert_eq!(*guard.state(), SessionState::Checking);
    }

    /// Test: an empty store resolves to a redirect carrying the origin.
    #[test]
    fn test_resolve_empty_store_redirects() {
        let (_dir, store) = temp_store();
        let mut guard = SessionGuard::new(store);

        let state = guard.resolve("/clientes");
        assert_eq!(
            *state,
            SessionState::Unauthenticated {
                redirect: "/login?from=%2Fclientes".to_string()
            }
        );
    }

    /// Test: a stored session resolves to `Authenticated` with the pair.
    #[test]
    fn test_resolve_stored_session() {
        let (_dir, store) = temp_store();
        store.save("t1", &sample_profile());
        let mut guard = SessionGuard::new(store);

        match guard.resolve("/clientes") {
            SessionState::Authenticated(session) => {
                assert_eq!(session.token, "t1");
                assert_eq!(session.profile.name, "Ana");
            }
            other => panic!("expected Authenticated, got {other:?}"),
        }
    }

    /// Test: a corrupt session file redirects and leaves the slot cleared.
    #[test]
    fn test_resolve_corrupt_session_redirects_and_clears() {
        let (dir, store) = temp_store();
        let path = dir.path().join("session.json");
        std::fs::write(&path, r#"{"auth_token":"t1","user_data":"garbled"}"#).unwrap();
        let mut guard = SessionGuard::new(store);

        match guard.resolve("/perfil") {
            SessionState::Unauthenticated { redirect } => {
                assert_eq!(redirect, "/login?from=%2Fperfil");
            }
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
        assert!(!path.exists());
    }

    /// Test: the originating path survives query strings intact.
    #[test]
    fn test_login_redirect_encodes_origin() {
        assert_eq!(
            login_redirect("/clientes/novo?origem=lista"),
            "/login?from=%2Fclientes%2Fnovo%3Forigem%3Dlista"
        );
    }
}
