//! Reel Engine
//!
//! Adaptive source negotiation for an embedded video player: when playback
//! fails on a stream, ask the backend once whether it can transcode, then walk
//! the client's codec list one entry at a time, resuming where playback
//! stopped.
//!
//! # Example
//! ```rust,ignore
//! use reel_engine::{PlayerSession, SessionOptions, MemoryStore};
//!
//! let session = PlayerSession::new(player, client, store, &env.base_url, SessionOptions::new());
//! session.load_sources(&builder.list(&id, availability, ".mkv")?);
//! executor.spawn(async move { session.handle_event(PlayerEvent::Error).await });
//! ```

pub mod advisory;
pub mod config;
pub mod fallback;
pub mod session;
pub mod store;

pub use advisory::{failed_codecs_key, FailedCodecRecord, FAILED_CODECS_KEY_PREFIX};
pub use config::{SessionOptions, SEEK_TOLERANCE_SECONDS};
pub use fallback::{CapabilityFlag, Decision, FallbackEngine, FallbackState};
pub use session::PlayerSession;
pub use store::{MemoryStore, SessionStore, StoreError};

// Re-export sub-crates for front ends
pub use reel_media as media;
pub use reel_net as net;
pub use reel_source as source;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
