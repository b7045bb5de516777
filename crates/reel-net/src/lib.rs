//! Reel Networking
//!
//! HTTP fetches and the backend capability check.

pub mod capability;
pub mod fetch;
pub mod loader;

pub use capability::{capability_url, parse_capability, CapabilityClient, HttpCapabilityClient, CAPABILITY_PATH};
pub use fetch::FetchResponse;
pub use loader::{Request, ResourceLoader};

/// HTTP Response
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}
