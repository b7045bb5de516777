//! Playback Fallback Engine
//!
//! Walks the codec list embedded in the current stream URL whenever the
//! player reports an error. The engine does no I/O: it tells the caller when a
//! capability check is needed and what URL to load next, and the caller
//! reports the check's outcome back.
//!
//! ```text
//! Idle ──error──▶ AwaitingCapability ──resolved──▶ Negotiating ──metadata──▶ Idle
//!   │                                      └─────▶ Blocked
//!   └──error (flag known)──▶ Negotiating | Blocked
//! ```

use reel_media::CodecId;
use reel_net::NetError;
use reel_source::NegotiationState;

use crate::advisory::FailedCodecRecord;

/// Whether the backend can renegotiate codecs, cached per player instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapabilityFlag {
    #[default]
    Unknown,
    Enabled,
    Disabled,
}

impl CapabilityFlag {
    /// Fail closed: anything but a successful `true` disables fallback
    pub fn from_check(result: &Result<bool, NetError>) -> Self {
        match result {
            Ok(true) => Self::Enabled,
            Ok(false) | Err(_) => Self::Disabled,
        }
    }
}

/// Engine state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackState {
    #[default]
    Idle,
    /// A capability check is in flight; errors queue behind it
    AwaitingCapability,
    /// No further automated recovery
    Blocked,
    /// A new source was issued and has not produced metadata yet
    Negotiating,
}

/// What the caller should do about an error event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The source is not a negotiable stream
    Ignored,
    /// The error belongs to an attempt that was already replaced
    Coalesced,
    /// Run the capability check and pass its outcome to
    /// [`FallbackEngine::resolve_capability`]
    CheckCapability,
    /// Queued behind the capability check already in flight
    Deferred,
    /// The backend cannot renegotiate; leave the error to the player
    Blocked,
    /// Every codec was tried; leave the error to the player
    Exhausted,
    /// Load `url`, then restore the position once metadata arrives
    Advance {
        url: String,
        failed: CodecId,
        next: CodecId,
    },
}

/// Codec fallback state machine for one player instance
#[derive(Debug)]
pub struct FallbackEngine {
    state: FallbackState,
    flag: CapabilityFlag,
    /// Sources of errors waiting on the capability check, in arrival order
    queued: Vec<String>,
    /// Video id and highest attempt index handed out so far
    issued: Option<(String, usize)>,
    advisory: FailedCodecRecord,
}

impl FallbackEngine {
    pub fn new(advisory: FailedCodecRecord) -> Self {
        Self {
            state: FallbackState::Idle,
            flag: CapabilityFlag::Unknown,
            queued: Vec::new(),
            issued: None,
            advisory,
        }
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    pub fn capability(&self) -> CapabilityFlag {
        self.flag
    }

    /// React to a playback error while `current_src` was loaded
    pub fn on_error(&mut self, current_src: &str) -> Decision {
        let Some(negotiation) = NegotiationState::from_url(current_src) else {
            tracing::debug!("Error on non-negotiable source {}", current_src);
            return Decision::Ignored;
        };

        if self.is_stale(&negotiation) {
            tracing::debug!(
                "Coalescing error for {} attempt {}",
                negotiation.video_id,
                negotiation.attempt_index
            );
            return Decision::Coalesced;
        }

        match self.flag {
            CapabilityFlag::Unknown => {
                self.queued.push(current_src.to_string());
                if self.state == FallbackState::AwaitingCapability {
                    Decision::Deferred
                } else {
                    self.state = FallbackState::AwaitingCapability;
                    Decision::CheckCapability
                }
            }
            CapabilityFlag::Disabled => {
                self.state = FallbackState::Blocked;
                Decision::Blocked
            }
            CapabilityFlag::Enabled => self.negotiate(current_src, negotiation),
        }
    }

    /// Record the capability check's outcome and settle every queued error
    /// with it, in arrival order
    pub fn resolve_capability(&mut self, result: Result<bool, NetError>) -> Vec<Decision> {
        if self.flag == CapabilityFlag::Unknown {
            self.flag = CapabilityFlag::from_check(&result);
            match &result {
                Ok(enabled) => tracing::info!("Backend transcoding enabled: {}", enabled),
                Err(e) => tracing::warn!("Capability check failed, fallback disabled: {}", e),
            }
        }
        if self.state == FallbackState::AwaitingCapability {
            self.state = FallbackState::Idle;
        }

        let queued = std::mem::take(&mut self.queued);
        queued.iter().map(|src| self.on_error(src)).collect()
    }

    /// The issued source produced metadata
    pub fn on_source_ready(&mut self) {
        if self.state == FallbackState::Negotiating {
            self.state = FallbackState::Idle;
        }
    }

    /// Forget negotiation progress; used when another video is loaded.
    /// The capability flag belongs to the player instance and is kept.
    pub fn reset(&mut self) {
        self.queued.clear();
        self.issued = None;
        if self.state != FallbackState::AwaitingCapability {
            self.state = FallbackState::Idle;
        }
    }

    fn is_stale(&self, negotiation: &NegotiationState) -> bool {
        match &self.issued {
            Some((video_id, attempt)) => {
                *video_id == negotiation.video_id && negotiation.attempt_index < *attempt
            }
            None => false,
        }
    }

    fn negotiate(&mut self, current_src: &str, negotiation: NegotiationState) -> Decision {
        let failed = negotiation.current_codec();

        let Some(next) = negotiation.advanced() else {
            tracing::warn!(
                "All {} codecs failed for {}, giving up",
                negotiation.codec_list.len(),
                negotiation.video_id
            );
            self.advisory.record(&negotiation.video_id, failed);
            self.state = FallbackState::Blocked;
            return Decision::Exhausted;
        };

        let url = match next.apply_to_url(current_src) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Could not rewrite {}: {}", current_src, e);
                return Decision::Ignored;
            }
        };

        self.advisory.record(&negotiation.video_id, failed);
        self.issued = Some((next.video_id.clone(), next.attempt_index));
        self.state = FallbackState::Negotiating;

        let next_codec = next.current_codec();
        tracing::info!(
            "Codec {} failed for {}, trying {} ({}/{})",
            failed,
            next.video_id,
            next_codec,
            next.attempt_index + 1,
            next.codec_list.len()
        );

        Decision::Advance {
            url,
            failed,
            next: next_codec,
        }
    }
}
