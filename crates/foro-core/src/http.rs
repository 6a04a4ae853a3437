//! HTTP client for the backend REST API.
//!
//! Every outgoing request passes through here: the stored bearer token is
//! attached automatically (public endpoints excepted) and a 401 on an
//! authenticated call clears the stored session and forces navigation to
//! the login page, exactly once per invalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::session::guard::LOGIN_PATH;
use crate::session::store::SessionStore;

/// Standard User-Agent header for foro API requests.
pub const USER_AGENT: &str = concat!("foro/", env!("CARGO_PKG_VERSION"));

/// Endpoints reachable without a session. They never send a bearer token,
/// and a 401 from them is a credential rejection rather than an expired
/// session.
const PUBLIC_PATHS: &[&str] = &[
    "/api/auth/login",
    "/api/usuarios/registrar",
    "/api/listar-cargos",
];

/// Receives the forced navigation triggered by the 401 interceptor.
///
/// The consumer wires this to its router; tests inject a recording fake.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Default navigator: logs the request and goes nowhere.
#[derive(Debug, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, path: &str) {
        debug!("Navigation requested to {path}");
    }
}

/// Client for the backend REST API.
///
/// Holds the session store it reads tokens from; callers never attach
/// credentials or handle expiry themselves.
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    signed_out: AtomicBool,
}

impl ApiClient {
    /// Creates a client from configuration with the default navigator.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config, store: SessionStore) -> Result<Self> {
        Self::with_navigator(config, store, Arc::new(NoopNavigator))
    }

    /// Creates a client with an injected navigator.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn with_navigator(
        config: &Config,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base_url = config.effective_base_url()?;

        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            http,
            store,
            navigator,
            signed_out: AtomicBool::new(false),
        })
    }

    /// The store this client reads tokens from.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// GET returning typed JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.send(path, self.http.get(self.url(path))).await?;
        decode_json(response).await
    }

    /// GET returning the raw response bytes (photo downloads).
    pub async fn get_bytes(&self, path: &str) -> ApiResult<Bytes> {
        let response = self.send(path, self.http.get(self.url(path))).await?;
        response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(&e))
    }

    /// POST with a JSON body, returning typed JSON.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(path, self.http.post(self.url(path)).json(body))
            .await?;
        decode_json(response).await
    }

    /// POST with a JSON body, discarding any response payload.
    pub async fn post_json_discard<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(path, self.http.post(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    /// POST without a body, discarding any response payload.
    pub async fn post_empty(&self, path: &str) -> ApiResult<()> {
        self.send(path, self.http.post(self.url(path))).await?;
        Ok(())
    }

    /// PUT with a JSON body, returning typed JSON.
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(path, self.http.put(self.url(path)).json(body))
            .await?;
        decode_json(response).await
    }

    /// PUT with a JSON body, discarding any response payload.
    pub async fn put_json_discard<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(path, self.http.put(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    /// PATCH with a JSON body, discarding any response payload.
    pub async fn patch_json_discard<B>(&self, path: &str, body: &B) -> ApiResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.send(path, self.http.patch(self.url(path)).json(body))
            .await?;
        Ok(())
    }

    /// PATCH with a multipart form, returning typed JSON.
    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ApiResult<T> {
        let response = self
            .send(path, self.http.patch(self.url(path)).multipart(form))
            .await?;
        decode_json(response).await
    }

    /// DELETE, discarding any response body.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send(path, self.http.delete(self.url(path))).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Attaches the bearer token, sends, and maps failures onto the error
    /// taxonomy. The one side effect lives here: the first 401 on an
    /// authenticated path clears the store and navigates to login.
    async fn send(&self, path: &str, request: RequestBuilder) -> ApiResult<Response> {
        let public = is_public_path(path);
        let request = if public {
            request
        } else if let Some(session) = self.store.read() {
            // A usable token re-arms the interceptor after a sign-out.
            self.signed_out.store(false, Ordering::SeqCst);
            request.bearer_auth(session.token)
        } else {
            request
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(self.handle_unauthorized(public, response).await);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status.as_u16(), &body));
        }

        Ok(response)
    }

    async fn handle_unauthorized(&self, public: bool, response: Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        if public {
            return ApiError::invalid_credentials(&body);
        }

        // Only the first 401 of an invalidation clears the slot and
        // redirects; concurrent calls just see the error.
        if !self.signed_out.swap(true, Ordering::SeqCst) {
            warn!("Session rejected by the backend; signing out");
            self.store.clear();
            self.navigator.navigate(LOGIN_PATH);
        }
        ApiError::session_expired()
    }
}

/// Returns true for endpoints reachable without a session.
fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

fn classify_reqwest_error(e: &reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::connection(format!("Connection failed: {e}"))
    } else {
        ApiError::connection(format!("Network error: {e}"))
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
        .json()
        .await
        .map_err(|e| ApiError::parse(format!("Invalid response body: {e}")))
}

fn map_error_status(status: u16, body: &str) -> ApiError {
    if (400..500).contains(&status) && status != 401 {
        ApiError::malformed_request(status, body)
    } else {
        ApiError::http_status(status, body)
    }
}
