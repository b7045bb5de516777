//! Playback Configuration
//!
//! Deployment settings resolved once at startup. Everything is optional; an
//! unset field falls back to what can be derived from the page location.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SourceError;

/// Which kind of deployment the client is talking to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(SourceError::InvalidValue {
                key: "environment",
                value: s.to_string(),
            }),
        }
    }
}

/// How media files reach the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServedBy {
    /// Pre-rendered files served directly by the reverse proxy
    Static,
    /// Everything goes through the streaming backend
    Dynamic,
}

impl FromStr for ServedBy {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "dynamic" => Ok(Self::Dynamic),
            _ => Err(SourceError::InvalidValue {
                key: "served_by",
                value: s.to_string(),
            }),
        }
    }
}

/// Playback configuration options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Force the environment instead of classifying the page location
    pub environment: Option<Environment>,

    /// Force the served-by mode
    pub served_by: Option<ServedBy>,

    /// Use this origin verbatim instead of deriving one
    pub base_url: Option<String>,

    /// Backend port used in development
    pub dev_server_port: Option<u16>,

    /// Origin used for shareable watch links
    pub shareable_link_domain: Option<String>,
}

impl PlaybackConfig {
    /// Parse a JSON document
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded playback config from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Apply `REEL_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self, SourceError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (`REEL_ENVIRONMENT`,
    /// `REEL_SERVED_BY`, `REEL_BASE_URL`, `REEL_SERVER_PORT`,
    /// `REEL_SHARE_DOMAIN`)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("REEL_ENVIRONMENT") {
            self.environment = Some(value.parse()?);
        }
        if let Some(value) = lookup("REEL_SERVED_BY") {
            self.served_by = Some(value.parse()?);
        }
        if let Some(value) = lookup("REEL_BASE_URL") {
            self.base_url = Some(value);
        }
        if let Some(value) = lookup("REEL_SERVER_PORT") {
            let port = value.trim().parse().map_err(|_| SourceError::InvalidValue {
                key: "dev_server_port",
                value: value.clone(),
            })?;
            self.dev_server_port = Some(port);
        }
        if let Some(value) = lookup("REEL_SHARE_DOMAIN") {
            self.shareable_link_domain = Some(value);
        }
        Ok(self)
    }
}
