//! Failed Codec Record
//!
//! Per-video list of codecs that already failed in this tab. Purely advisory:
//! negotiation is driven by the URL's attempt index, so every read or write
//! here is best-effort and failures are only logged.

use std::rc::Rc;

use reel_media::CodecId;

use crate::store::SessionStore;

/// Storage key prefix; the video id is appended
pub const FAILED_CODECS_KEY_PREFIX: &str = "fs_failed_codecs_";

pub fn failed_codecs_key(video_id: &str) -> String {
    format!("{FAILED_CODECS_KEY_PREFIX}{video_id}")
}

/// Append-only record of failed codecs, keyed by video id
#[derive(Clone)]
pub struct FailedCodecRecord {
    store: Rc<dyn SessionStore>,
}

impl FailedCodecRecord {
    pub fn new(store: Rc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Codecs recorded for `video_id`, oldest first. Unreadable entries and
    /// unknown names are skipped.
    pub fn load(&self, video_id: &str) -> Vec<CodecId> {
        self.load_names(video_id)
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }

    /// Remember that `codec` failed for `video_id`
    pub fn record(&self, video_id: &str, codec: CodecId) {
        let mut names = self.load_names(video_id);
        if names.iter().any(|n| n == codec.as_str()) {
            return;
        }
        names.push(codec.as_str().to_string());

        let key = failed_codecs_key(video_id);
        let value = match serde_json::to_string(&names) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Could not encode failed codecs for {}: {}", video_id, e);
                return;
            }
        };
        if let Err(e) = self.store.set(&key, &value) {
            tracing::debug!("Could not record failed codec {} for {}: {}", codec, video_id, e);
        }
    }

    fn load_names(&self, video_id: &str) -> Vec<String> {
        self.store
            .get(&failed_codecs_key(video_id))
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for FailedCodecRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailedCodecRecord").finish_non_exhaustive()
    }
}
