//! Session, auth, and API core for the foro legal-practice client.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod resources;
pub mod session;
