//! Capability Check
//!
//! Asks the backend whether it can transcode on the fly. Only a 2xx answer
//! with a well-formed `{"enabled": bool}` body counts; the caller turns every
//! error into "disabled".

use std::future::Future;

use serde::Deserialize;

use crate::fetch::FetchResponse;
use crate::loader::{Request, ResourceLoader};
use crate::NetError;

/// Path of the capability endpoint below the base URL
pub const CAPABILITY_PATH: &str = "/api/transcoding/enabled";

/// Something that can answer the capability question
pub trait CapabilityClient {
    fn transcoding_enabled(&self, base_url: &str) -> impl Future<Output = Result<bool, NetError>>;
}

#[derive(Debug, Deserialize)]
struct CapabilityBody {
    enabled: bool,
}

pub fn capability_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), CAPABILITY_PATH)
}

/// Interpret a capability response
pub fn parse_capability(response: &FetchResponse) -> Result<bool, NetError> {
    if !response.ok() {
        return Err(NetError::HttpError {
            status: response.status(),
        });
    }
    let body: CapabilityBody = response.json()?;
    Ok(body.enabled)
}

/// Capability client over HTTP
#[derive(Debug, Clone)]
pub struct HttpCapabilityClient {
    loader: ResourceLoader,
}

impl HttpCapabilityClient {
    pub fn new(loader: ResourceLoader) -> Self {
        Self { loader }
    }
}

impl CapabilityClient for HttpCapabilityClient {
    async fn transcoding_enabled(&self, base_url: &str) -> Result<bool, NetError> {
        let url = capability_url(base_url);
        let response = self
            .loader
            .request(Request::get(&url).with_header("Accept", "application/json"))
            .await?;
        parse_capability(&FetchResponse::from(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Response;

    fn response(status: u16, body: &str) -> FetchResponse {
        FetchResponse::from(Response {
            status,
            body: body.as_bytes().to_vec(),
        })
    }

    #[test]
    fn test_capability_url() {
        assert_eq!(capability_url("http://x/"), "http://x/api/transcoding/enabled");
        assert_eq!(capability_url("http://x"), "http://x/api/transcoding/enabled");
    }

    #[test]
    fn test_enabled_and_disabled() {
        assert!(parse_capability(&response(200, r#"{"enabled": true}"#)).unwrap());
        assert!(!parse_capability(&response(200, r#"{"enabled": false}"#)).unwrap());
    }

    #[test]
    fn test_non_success_is_an_error() {
        let err = parse_capability(&response(503, r#"{"enabled": true}"#)).unwrap_err();
        assert!(matches!(err, NetError::HttpError { status: 503 }));
    }

    #[test]
    fn test_malformed_bodies() {
        for body in ["", "{}", r#"{"enabled": "yes"}"#, "[true]"] {
            assert!(matches!(
                parse_capability(&response(200, body)),
                Err(NetError::Malformed(_))
            ));
        }
    }
}
