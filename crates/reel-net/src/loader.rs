//! Resource Loader
//!
//! HTTP GETs on reqwest's blocking client. Requests run on smol's blocking
//! thread pool so callers on a single-threaded executor only ever await.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::{NetError, Response};

/// Default request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request configuration
#[derive(Debug, Default)]
pub struct Request {
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn get(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }
}

/// Load resources from network
#[derive(Debug, Clone)]
pub struct ResourceLoader {
    client: Client,
}

impl ResourceLoader {
    pub fn new() -> Result<Self, NetError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, NetError> {
        let client = Client::builder()
            .user_agent(concat!("Reel/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| NetError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Make an HTTP request
    pub async fn request(&self, req: Request) -> Result<Response, NetError> {
        url::Url::parse(&req.url).map_err(|e| NetError::InvalidUrl(format!("{}: {e}", req.url)))?;
        tracing::info!("HTTP GET {}", req.url);

        let client = self.client.clone();
        smol::unblock(move || send(&client, req)).await
    }
}

fn send(client: &Client, req: Request) -> Result<Response, NetError> {
    let mut builder = client.get(&req.url);
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let response = builder.send().map_err(|e| NetError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| NetError::Network(e.to_string()))?
        .to_vec();

    tracing::debug!("HTTP {} from {} ({} bytes)", status, req.url, body.len());
    Ok(Response { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = Request::get("https://example.com").with_header("Accept", "application/json");

        assert_eq!(req.url, "https://example.com");
        assert_eq!(req.headers.get("Accept").unwrap(), "application/json");
    }

    #[test]
    fn test_invalid_url_fails_before_sending() {
        let loader = ResourceLoader::new().unwrap();
        let result = smol::block_on(loader.request(Request::get("not a url")));
        assert!(matches!(result, Err(NetError::InvalidUrl(_))));
    }
}
