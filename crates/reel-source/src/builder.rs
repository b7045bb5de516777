//! Source URL Builder
//!
//! Turns a video id, quality and container extension into the URL the player
//! loads. Static deployments get paths to pre-rendered files; dynamic ones get
//! stream URLs carrying a fresh [`NegotiationState`].

use reel_media::{SourceEntry, SupportedCodecList};
use serde::Deserialize;

use crate::config::ServedBy;
use crate::environment::ResolvedEnvironment;
use crate::negotiation::NegotiationState;
use crate::SourceError;

/// MIME type announced for every source; the backend always delivers MP4
pub const SOURCE_MIME_TYPE: &str = "video/mp4";

/// Quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    P720,
    P1080,
    Original,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::Original => "original",
        }
    }

    /// Label shown in the quality selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::Original => "Original",
        }
    }
}

/// What to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub id: String,
    pub quality: Quality,
    /// Container extension including the dot, e.g. `.mkv`
    pub extension: String,
}

impl VideoSource {
    pub fn new(id: &str, quality: Quality, extension: &str) -> Self {
        Self {
            id: id.to_string(),
            quality,
            extension: extension.to_string(),
        }
    }
}

/// Which derived qualities exist for a video, as reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Availability {
    pub has_720p: bool,
    pub has_1080p: bool,
}

fn is_mkv(extension: &str) -> bool {
    extension.eq_ignore_ascii_case(".mkv")
}

/// File name of the original under `_content/video`; Matroska sources are
/// served from their MP4 remux
pub fn video_path(id: &str, extension: &str) -> String {
    if is_mkv(extension) {
        format!("{id}-1.mp4")
    } else {
        format!("{id}{extension}")
    }
}

/// Build the URL for one source
pub fn build_source_url(
    source: &VideoSource,
    served_by: ServedBy,
    base_url: &str,
    codecs: &SupportedCodecList,
) -> Result<String, SourceError> {
    let base = base_url.trim_end_matches('/');
    let id = &source.id;

    match (source.quality, served_by) {
        (Quality::P720 | Quality::P1080, ServedBy::Static) => Ok(format!(
            "{base}/_content/derived/{id}/{id}-{}.mp4",
            source.quality.as_str()
        )),
        (Quality::P720 | Quality::P1080, ServedBy::Dynamic) => {
            NegotiationState::new(id, codecs.clone()).to_stream_url(base, Some(source.quality.as_str()), None)
        }
        (Quality::Original, ServedBy::Static) => {
            Ok(format!("{base}/_content/video/{}", video_path(id, &source.extension)))
        }
        (Quality::Original, ServedBy::Dynamic) => {
            let subid = is_mkv(&source.extension).then_some(1);
            NegotiationState::new(id, codecs.clone()).to_stream_url(base, None, subid)
        }
    }
}

/// Resolved environment plus codec list, bound once per player session
#[derive(Debug, Clone)]
pub struct SourceBuilder {
    env: ResolvedEnvironment,
    codecs: SupportedCodecList,
}

impl SourceBuilder {
    pub fn new(env: ResolvedEnvironment, codecs: SupportedCodecList) -> Self {
        Self { env, codecs }
    }

    pub fn environment(&self) -> &ResolvedEnvironment {
        &self.env
    }

    pub fn codecs(&self) -> &SupportedCodecList {
        &self.codecs
    }

    pub fn url(&self, source: &VideoSource) -> Result<String, SourceError> {
        build_source_url(source, self.env.served_by, &self.env.base_url, &self.codecs)
    }

    /// Selectable sources for a video. 720p and 1080p appear only when
    /// available; Original is always last and always the default.
    pub fn list(
        &self,
        video_id: &str,
        availability: Availability,
        extension: &str,
    ) -> Result<Vec<SourceEntry>, SourceError> {
        let mut qualities = Vec::with_capacity(3);
        if availability.has_720p {
            qualities.push(Quality::P720);
        }
        if availability.has_1080p {
            qualities.push(Quality::P1080);
        }
        qualities.push(Quality::Original);

        qualities
            .into_iter()
            .map(|quality| {
                let src = self.url(&VideoSource::new(video_id, quality, extension))?;
                Ok(SourceEntry {
                    src,
                    mime_type: SOURCE_MIME_TYPE.to_string(),
                    label: quality.label().to_string(),
                    selected: quality == Quality::Original,
                })
            })
            .collect()
    }
}

/// Free-function form of [`SourceBuilder::list`]
pub fn build_source_list(
    video_id: &str,
    availability: Availability,
    extension: &str,
    env: &ResolvedEnvironment,
    codecs: &SupportedCodecList,
) -> Result<Vec<SourceEntry>, SourceError> {
    SourceBuilder::new(env.clone(), codecs.clone()).list(video_id, availability, extension)
}
