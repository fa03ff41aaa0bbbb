//! Asynchronous JSON fetch against the portal.
//!
//! `JsonClient::get_json` issues exactly one GET per call and completes once:
//! the decoded body for status 200, `FetchError::Status` for anything else.
//! There is no retry and no timeout. Transport failures complete with
//! `FetchError::Transport` instead of never completing.

use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a status other than 200. The body was not read.
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid JSON body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request path '{0}'")]
    InvalidPath(String),
}

impl FetchError {
    /// The HTTP status carried by a `Status` failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Resolves relative paths against a base URL, the way a page resolves
/// `networks` against its own location.
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: reqwest::Client,
    base: Url,
}

impl JsonClient {
    /// The portal is a local endpoint, so system proxies are bypassed.
    pub fn new(base_url: &str) -> crate::Result<Self> {
        let http = reqwest::Client::builder().no_proxy().build()?;
        Self::with_client(http, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> crate::Result<Self> {
        let base = Url::parse(base_url).map_err(|e| crate::Error::BaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        if path.is_empty() {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        let url = self
            .base
            .join(path)
            .map_err(|_| FetchError::InvalidPath(path.to_string()))?;

        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;

        let status = response.status().as_u16();
        if status != 200 {
            tracing::debug!(status, path, "Non-200 response, body dropped");
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Starts the request and returns immediately.
    ///
    /// `on_complete` runs exactly once, on the spawned task, when the request
    /// settles. Must be called from within a Tokio runtime.
    pub fn spawn_fetch<T, F>(&self, path: &str, on_complete: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, FetchError>) + Send + 'static,
    {
        let client = self.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            let result = client.get_json::<T>(&path).await;
            on_complete(result);
        })
    }
}
