//! Typed wrappers over the backend REST resources.

pub mod clients;
pub mod users;

pub use clients::ClientsApi;
pub use users::{ProfileUpdate, UsersApi};
