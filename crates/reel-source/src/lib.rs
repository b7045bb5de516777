//! Reel Source
//!
//! Where the player's media comes from.
//!
//! Features:
//! - Environment resolution (development server vs. production proxy)
//! - Playback configuration with environment overrides
//! - Static and streaming source URLs
//! - Codec negotiation state encoded in stream URLs

pub mod builder;
pub mod config;
pub mod environment;
pub mod negotiation;

pub use builder::{
    build_source_list, build_source_url, video_path, Availability, Quality, SourceBuilder,
    VideoSource, SOURCE_MIME_TYPE,
};
pub use config::{Environment, PlaybackConfig, ServedBy};
pub use environment::{classify, public_watch_url, resolve_environment, Location, ResolvedEnvironment};
pub use negotiation::{NegotiationState, STREAM_PATH};

/// Source error
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
