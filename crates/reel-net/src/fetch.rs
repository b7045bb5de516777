//! Fetch Response
//!
//! Convenience accessors over a raw [`Response`].

use crate::{NetError, Response};

/// Fetch response with convenience methods
#[derive(Debug)]
pub struct FetchResponse {
    inner: Response,
}

impl FetchResponse {
    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.inner.status
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.inner.status)
    }

    /// Get body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.inner.body).map_err(|e| NetError::Malformed(e.to_string()))
    }
}

impl From<Response> for FetchResponse {
    fn from(inner: Response) -> Self {
        Self { inner }
    }
}
