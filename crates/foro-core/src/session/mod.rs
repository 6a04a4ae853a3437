//! Session state: the persisted token/profile slot and the page-mount gate.

pub mod guard;
pub mod store;

pub use guard::{LOGIN_PATH, SessionGuard, SessionState, login_redirect};
pub use store::{SessionStore, StoredSession, mask_token};
