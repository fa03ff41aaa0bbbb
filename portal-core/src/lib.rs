//! Core library for the Wi-Fi setup portal.
//! The device side exposes the scanned network list, the settings form and
//! the UI assets over HTTP. The page side fetches that list and renders it
//! into the `ssids` element of a page document.

pub mod traits;
pub mod backends;
pub mod client;
pub mod config;
pub mod factory;
pub mod frontends;
pub mod page;
pub mod store;
pub mod web_server;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid base URL '{url}': {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Web server error: {0}")]
    WebServer(#[from] axum::BoxError),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Scan failed: {0}")]
    ScanFailed(String),
}

/// A specialized `Result` type for this crate's operations.
pub type Result<T> = std::result::Result<T, Error>;
