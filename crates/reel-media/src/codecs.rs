//! Media Codecs
//!
//! Client-side codec capability detection. Every candidate in the catalog is
//! probed with its MIME type and the survivors are ranked by how confident the
//! platform is that it can play them.

use std::fmt;
use std::str::FromStr;

use crate::element::CanPlayType;
use crate::MediaError;

/// Video codec identifier, as understood by the streaming backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecId {
    H264,
    AV1,
    VP9,
    VP8,
    HEVC,
    MPEG4,
    MPEG2,
}

impl CodecId {
    /// Wire name used in the `codecs` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H264 => "H264",
            Self::AV1 => "AV1",
            Self::VP9 => "VP9",
            Self::VP8 => "VP8",
            Self::HEVC => "HEVC",
            Self::MPEG4 => "MPEG4",
            Self::MPEG2 => "MPEG2",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecId {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        CODEC_CATALOG
            .iter()
            .map(|c| c.name)
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| MediaError::UnknownCodec(name.to_string()))
    }
}

/// A codec together with the MIME type used to probe for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecCandidate {
    pub name: CodecId,
    pub probe_mime_type: &'static str,
}

/// Candidates in preference order. H264 leads so it wins every tie.
pub const CODEC_CATALOG: [CodecCandidate; 7] = [
    CodecCandidate { name: CodecId::H264, probe_mime_type: r#"video/mp4; codecs="avc1.42E01E, mp4a.40.2""# },
    CodecCandidate { name: CodecId::AV1, probe_mime_type: r#"video/mp4; codecs="av01.0.05M.08, mp4a.40.2""# },
    CodecCandidate { name: CodecId::VP9, probe_mime_type: r#"video/webm; codecs="vp9, opus""# },
    CodecCandidate { name: CodecId::VP8, probe_mime_type: r#"video/webm; codecs="vp8, vorbis""# },
    CodecCandidate { name: CodecId::HEVC, probe_mime_type: r#"video/mp4; codecs="hvc1.1.6.L93.B0""# },
    CodecCandidate { name: CodecId::MPEG4, probe_mime_type: r#"video/mp4; codecs="mp4v.20.9""# },
    CodecCandidate { name: CodecId::MPEG2, probe_mime_type: "video/mp2t" },
];

/// How confident the platform is about a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SupportRank {
    Unsupported,
    Maybe,
    Probable,
}

impl From<CanPlayType> for SupportRank {
    fn from(answer: CanPlayType) -> Self {
        match answer {
            CanPlayType::Probably => Self::Probable,
            CanPlayType::Maybe => Self::Maybe,
            CanPlayType::Empty => Self::Unsupported,
        }
    }
}

/// Anything that can answer `canPlayType` for a MIME string
pub trait PlayabilityProbe {
    fn can_play_type(&self, mime_type: &str) -> CanPlayType;
}

impl<F> PlayabilityProbe for F
where
    F: Fn(&str) -> CanPlayType,
{
    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        self(mime_type)
    }
}

/// Ordered, deduplicated, non-empty list of codecs.
///
/// The first entry is the codec requested initially; the rest are fallbacks
/// in the order they will be tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedCodecList(Vec<CodecId>);

impl SupportedCodecList {
    /// Build a list, dropping repeats. Returns `None` for an empty input.
    pub fn new(codecs: impl IntoIterator<Item = CodecId>) -> Option<Self> {
        let mut out = Vec::new();
        for codec in codecs {
            if !out.contains(&codec) {
                out.push(codec);
            }
        }
        if out.is_empty() { None } else { Some(Self(out)) }
    }

    /// The degenerate list used when nothing can be probed
    pub fn fallback() -> Self {
        Self(vec![CodecId::H264])
    }

    /// Parse the comma separated wire form (`H264,VP9`)
    pub fn parse(csv: &str) -> Result<Self, MediaError> {
        let codecs = csv
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(CodecId::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(codecs).ok_or(MediaError::EmptyCodecList)
    }

    pub fn first(&self) -> CodecId {
        self.0[0]
    }

    pub fn get(&self, index: usize) -> Option<CodecId> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, codec: CodecId) -> bool {
        self.0.contains(&codec)
    }

    pub fn iter(&self) -> impl Iterator<Item = CodecId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[CodecId] {
        &self.0
    }
}

impl fmt::Display for SupportedCodecList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, codec) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(codec.as_str())?;
        }
        Ok(())
    }
}

/// Detect the codecs this client can play, best first
pub fn detect_supported_codecs(probe: Option<&dyn PlayabilityProbe>) -> SupportedCodecList {
    detect_from_catalog(&CODEC_CATALOG, probe)
}

/// Same as [`detect_supported_codecs`] over an arbitrary catalog
pub fn detect_from_catalog(
    catalog: &[CodecCandidate],
    probe: Option<&dyn PlayabilityProbe>,
) -> SupportedCodecList {
    let Some(probe) = probe else {
        tracing::debug!("No playability probe, using H264 only");
        return SupportedCodecList::fallback();
    };

    let mut ranked: Vec<(CodecId, SupportRank)> = catalog
        .iter()
        .map(|c| (c.name, SupportRank::from(probe.can_play_type(c.probe_mime_type))))
        .filter(|(_, rank)| *rank != SupportRank::Unsupported)
        .collect();

    // sort_by is stable, so catalog order survives between equal ranks
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let mut codecs: Vec<CodecId> = Vec::with_capacity(ranked.len() + 1);
    for (name, _) in ranked {
        if !codecs.contains(&name) {
            codecs.push(name);
        }
    }
    if !codecs.contains(&CodecId::H264) {
        codecs.push(CodecId::H264);
    }

    tracing::debug!("Supported codecs: {:?}", codecs);
    SupportedCodecList(codecs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_of(mime: &str, table: &[(CodecId, CanPlayType)]) -> CanPlayType {
        CODEC_CATALOG
            .iter()
            .find(|c| c.probe_mime_type == mime)
            .and_then(|c| table.iter().find(|(id, _)| *id == c.name))
            .map(|(_, answer)| *answer)
            .unwrap_or(CanPlayType::Empty)
    }

    #[test]
    fn test_no_probe_falls_back_to_h264() {
        let list = detect_supported_codecs(None);
        assert_eq!(list.as_slice(), &[CodecId::H264]);
    }

    #[test]
    fn test_probable_before_maybe() {
        let table = [
            (CodecId::H264, CanPlayType::Maybe),
            (CodecId::VP9, CanPlayType::Probably),
            (CodecId::AV1, CanPlayType::Maybe),
        ];
        let probe = |mime: &str| rank_of(mime, &table);
        let list = detect_supported_codecs(Some(&probe));

        assert_eq!(list.as_slice(), &[CodecId::VP9, CodecId::H264, CodecId::AV1]);
    }

    #[test]
    fn test_h264_appended_when_unsupported() {
        let table = [(CodecId::VP8, CanPlayType::Probably)];
        let probe = |mime: &str| rank_of(mime, &table);
        let list = detect_supported_codecs(Some(&probe));

        assert_eq!(list.as_slice(), &[CodecId::VP8, CodecId::H264]);
    }

    #[test]
    fn test_everything_unsupported() {
        let probe = |_: &str| CanPlayType::Empty;
        let list = detect_supported_codecs(Some(&probe));
        assert_eq!(list.as_slice(), &[CodecId::H264]);
    }

    #[test]
    fn test_duplicate_catalog_entries_collapse() {
        let catalog = [
            CodecCandidate { name: CodecId::VP9, probe_mime_type: "a" },
            CodecCandidate { name: CodecId::VP9, probe_mime_type: "b" },
            CodecCandidate { name: CodecId::H264, probe_mime_type: "c" },
        ];
        let probe = |_: &str| CanPlayType::Probably;
        let list = detect_from_catalog(&catalog, Some(&probe));
        assert_eq!(list.as_slice(), &[CodecId::VP9, CodecId::H264]);
    }

    #[test]
    fn test_rank_order_holds_for_every_probe_outcome() {
        let answers = [CanPlayType::Empty, CanPlayType::Maybe, CanPlayType::Probably];
        let n = CODEC_CATALOG.len();

        for mut combo in 0..3usize.pow(n as u32) {
            let mut table = Vec::with_capacity(n);
            for candidate in CODEC_CATALOG.iter() {
                table.push((candidate.name, answers[combo % 3]));
                combo /= 3;
            }
            let probe = |mime: &str| rank_of(mime, &table);
            let list = detect_supported_codecs(Some(&probe));

            assert!(list.contains(CodecId::H264));
            let unique: std::collections::HashSet<_> = list.iter().collect();
            assert_eq!(unique.len(), list.len());

            let rank = |c: CodecId| {
                SupportRank::from(table.iter().find(|(id, _)| *id == c).map(|(_, a)| *a).unwrap())
            };
            let position = |c: CodecId| CODEC_CATALOG.iter().position(|x| x.name == c).unwrap();
            let probed: Vec<CodecId> = list
                .iter()
                .filter(|c| rank(*c) != SupportRank::Unsupported)
                .collect();
            for pair in probed.windows(2) {
                assert!(rank(pair[0]) >= rank(pair[1]));
                if rank(pair[0]) == rank(pair[1]) {
                    assert!(position(pair[0]) < position(pair[1]));
                }
            }
        }
    }

    #[test]
    fn test_parse_and_display() {
        let list = SupportedCodecList::parse("h264, vp9,AV1").unwrap();
        assert_eq!(list.as_slice(), &[CodecId::H264, CodecId::VP9, CodecId::AV1]);
        assert_eq!(list.to_string(), "H264,VP9,AV1");
    }

    #[test]
    fn test_parse_rejects_unknown_and_empty() {
        assert!(matches!(
            SupportedCodecList::parse("H264,THEORA"),
            Err(MediaError::UnknownCodec(_))
        ));
        assert!(matches!(SupportedCodecList::parse(""), Err(MediaError::EmptyCodecList)));
    }
}
