//! Reel Media
//!
//! Media-side building blocks for Reel.
//!
//! Features:
//! - Codec capability detection with ranked fallbacks
//! - The embedded player contract and an in-memory video element
//! - Duration override shim for containers with unreliable metadata

pub mod codecs;
pub mod duration;
pub mod element;

pub use codecs::{
    detect_from_catalog, detect_supported_codecs, CodecCandidate, CodecId, PlayabilityProbe,
    SupportRank, SupportedCodecList, CODEC_CATALOG,
};
pub use duration::HintedPlayer;
pub use element::{
    CanPlayType, MediaPlayer, PlaybackError, PlaybackErrorCode, PlayerEvent,
    ReadyState, SourceEntry, VideoElement,
};

/// Media error
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Unknown codec: {0}")]
    UnknownCodec(String),

    #[error("Codec list is empty")]
    EmptyCodecList,
}
