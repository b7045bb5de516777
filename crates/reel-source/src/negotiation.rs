//! Negotiation State
//!
//! Which codec the streaming endpoint is being asked for lives entirely in
//! the stream URL's query (`id`, `codecs`, `codec_try`). Encoding and decoding
//! go through this module so the two sides cannot drift apart: building a URL
//! and reading it back yields the same state.

use reel_media::{CodecId, SupportedCodecList};
use url::Url;

use crate::SourceError;

/// Path of the streaming endpoint below the base URL
pub const STREAM_PATH: &str = "/api/stream";

/// Codec negotiation carried by a stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiationState {
    pub video_id: String,
    pub codec_list: SupportedCodecList,
    /// Index into `codec_list` of the codec currently requested
    pub attempt_index: usize,
}

impl NegotiationState {
    /// Fresh state requesting the first codec
    pub fn new(video_id: &str, codec_list: SupportedCodecList) -> Self {
        Self {
            video_id: video_id.to_string(),
            codec_list,
            attempt_index: 0,
        }
    }

    pub fn current_codec(&self) -> CodecId {
        // attempt_index is kept in range by every constructor
        self.codec_list.get(self.attempt_index).unwrap_or_else(|| self.codec_list.first())
    }

    pub fn is_last_attempt(&self) -> bool {
        self.attempt_index + 1 >= self.codec_list.len()
    }

    /// State for the next codec, or `None` when the list is exhausted
    pub fn advanced(&self) -> Option<Self> {
        if self.is_last_attempt() {
            return None;
        }
        Some(Self {
            attempt_index: self.attempt_index + 1,
            ..self.clone()
        })
    }

    /// Read the state back out of a stream URL.
    ///
    /// Returns `None` for anything that is not a negotiable stream: static
    /// file paths, relative URLs, a missing `id` or `codecs`, or a `codec_try`
    /// outside the codec list. A missing `codec_try` means the first codec.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;

        let mut video_id = None;
        let mut codecs = None;
        let mut attempt = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "id" => video_id = Some(value.into_owned()),
                "codecs" => codecs = Some(value.into_owned()),
                "codec_try" => attempt = Some(value.into_owned()),
                _ => {}
            }
        }

        let video_id = video_id.filter(|id| !id.is_empty())?;
        let codec_list = SupportedCodecList::parse(&codecs?).ok()?;
        let attempt_index = match attempt {
            Some(raw) => raw.trim().parse::<usize>().ok()?,
            None => 0,
        };
        if attempt_index >= codec_list.len() {
            return None;
        }

        Some(Self {
            video_id,
            codec_list,
            attempt_index,
        })
    }

    /// Write this state's `codec_try` into an existing stream URL.
    ///
    /// Every other parameter keeps its value and position.
    pub fn apply_to_url(&self, url: &str) -> Result<String, SourceError> {
        let mut parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl(format!("{url}: {e}")))?;

        let mut pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let attempt = self.attempt_index.to_string();
        match pairs.iter_mut().find(|(k, _)| k == "codec_try") {
            Some(pair) => pair.1 = attempt,
            None => pairs.push(("codec_try".to_string(), attempt)),
        }

        parsed.query_pairs_mut().clear().extend_pairs(pairs);
        Ok(parsed.into())
    }

    /// Build a stream URL for this state.
    ///
    /// Parameter order is `id`, `quality`, `subid`, `codecs`, `codec_try`.
    pub fn to_stream_url(
        &self,
        base_url: &str,
        quality: Option<&str>,
        subid: Option<u32>,
    ) -> Result<String, SourceError> {
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), STREAM_PATH);
        let mut url =
            Url::parse(&endpoint).map_err(|e| SourceError::InvalidUrl(format!("{endpoint}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("id", &self.video_id);
            if let Some(quality) = quality {
                query.append_pair("quality", quality);
            }
            if let Some(subid) = subid {
                query.append_pair("subid", &subid.to_string());
            }
            query.append_pair("codecs", &self.codec_list.to_string());
            query.append_pair("codec_try", &self.attempt_index.to_string());
        }

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codecs(list: &[CodecId]) -> SupportedCodecList {
        SupportedCodecList::new(list.iter().copied()).unwrap()
    }

    #[test]
    fn test_build_then_read_back() {
        let state = NegotiationState::new("abc", codecs(&[CodecId::VP9, CodecId::H264]));
        let url = state.to_stream_url("http://x", Some("720p"), None).unwrap();

        assert_eq!(url, "http://x/api/stream?id=abc&quality=720p&codecs=VP9%2CH264&codec_try=0");
        assert_eq!(NegotiationState::from_url(&url), Some(state));
    }

    #[test]
    fn test_awkward_ids_survive() {
        let state = NegotiationState::new("a b&c=d/é", codecs(&[CodecId::H264]));
        let url = state.to_stream_url("https://clips.example.com/", None, Some(1)).unwrap();
        assert_eq!(NegotiationState::from_url(&url), Some(state));
    }

    #[test]
    fn test_static_paths_are_not_negotiable() {
        assert_eq!(NegotiationState::from_url("http://x/_content/video/abc.mp4"), None);
        assert_eq!(NegotiationState::from_url("/api/stream?id=abc&codecs=H264"), None);
        assert_eq!(NegotiationState::from_url("http://x/api/stream?id=abc"), None);
        assert_eq!(NegotiationState::from_url("http://x/api/stream?codecs=H264"), None);
    }

    #[test]
    fn test_out_of_range_attempt_is_rejected() {
        assert_eq!(
            NegotiationState::from_url("http://x/api/stream?id=abc&codecs=H264&codec_try=1"),
            None
        );
        assert_eq!(
            NegotiationState::from_url("http://x/api/stream?id=abc&codecs=H264&codec_try=-1"),
            None
        );
    }

    #[test]
    fn test_missing_attempt_means_first() {
        let state = NegotiationState::from_url("http://x/api/stream?id=abc&codecs=AV1%2CH264").unwrap();
        assert_eq!(state.attempt_index, 0);
        assert_eq!(state.current_codec(), CodecId::AV1);
    }

    #[test]
    fn test_advance_stops_at_last() {
        let state = NegotiationState::new("abc", codecs(&[CodecId::AV1, CodecId::H264]));
        let next = state.advanced().unwrap();
        assert_eq!(next.attempt_index, 1);
        assert_eq!(next.current_codec(), CodecId::H264);
        assert!(next.is_last_attempt());
        assert_eq!(next.advanced(), None);
    }

    #[test]
    fn test_apply_keeps_other_parameters() {
        let url = "http://x/api/stream?id=abc&subid=1&codecs=AV1%2CH264&codec_try=0";
        let next = NegotiationState::from_url(url).unwrap().advanced().unwrap();

        assert_eq!(
            next.apply_to_url(url).unwrap(),
            "http://x/api/stream?id=abc&subid=1&codecs=AV1%2CH264&codec_try=1"
        );
    }
}
