//! Media Elements
//!
//! The contract the embedded player widget exposes, plus `VideoElement`, an
//! in-memory implementation used by front ends without a real widget and by
//! tests.

use std::collections::HashMap;

use crate::codecs::PlayabilityProbe;

/// Ready state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
}

/// Error reported by the player itself
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackError {
    pub code: PlaybackErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackErrorCode {
    Aborted = 1,
    Decode = 3,
    SrcNotSupported = 4,
}

/// Can play type result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanPlayType {
    Empty,
    Maybe,
    Probably,
}

/// Events the player emits and the playback layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    Error,
    LoadedMetadata,
    Play,
    Ready,
    DurationChange,
    TimeUpdate,
}

impl PlayerEvent {
    /// DOM event name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::LoadedMetadata => "loadedmetadata",
            Self::Play => "play",
            Self::Ready => "ready",
            Self::DurationChange => "durationchange",
            Self::TimeUpdate => "timeupdate",
        }
    }
}

/// One selectable source, in the shape quality-selector widgets expect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub src: String,
    pub mime_type: String,
    pub label: String,
    pub selected: bool,
}

/// Operations the playback layer needs from the embedded player
pub trait MediaPlayer {
    /// URL of the source currently loaded (empty when none)
    fn current_src(&self) -> &str;

    /// Replace the source with a single URL and start loading it
    fn set_src(&mut self, url: &str);

    /// Replace the source with a list of selectable qualities
    fn set_sources(&mut self, sources: &[SourceEntry]);

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn duration(&self) -> f64;

    fn set_duration(&mut self, seconds: f64);

    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Fire an event at the player's own listeners (controls, displays)
    fn trigger(&mut self, event: PlayerEvent);

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// In-memory video element
#[derive(Debug)]
pub struct VideoElement {
    pub sources: Vec<SourceEntry>,
    pub current_src: String,
    pub ready_state: ReadyState,
    pub error: Option<PlaybackError>,
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    /// Events fired through [`MediaPlayer::trigger`], oldest first
    pub triggered: Vec<PlayerEvent>,
    /// Every URL handed to the element, oldest first
    pub load_history: Vec<String>,
    disposed: bool,
    support: HashMap<String, CanPlayType>,
}

impl VideoElement {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            current_src: String::new(),
            ready_state: ReadyState::HaveNothing,
            error: None,
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            triggered: Vec::new(),
            load_history: Vec::new(),
            disposed: false,
            support: HashMap::new(),
        }
    }

    /// Override the `canPlayType` answer for one MIME string
    pub fn with_support(mut self, mime_type: &str, answer: CanPlayType) -> Self {
        self.support.insert(mime_type.to_string(), answer);
        self
    }

    /// Simulate the media's metadata arriving
    pub fn load_metadata(&mut self, duration: f64) {
        self.duration = duration;
        self.ready_state = ReadyState::HaveMetadata;
    }

    /// Simulate a decode or network failure on the current source
    pub fn fail(&mut self, code: PlaybackErrorCode, message: &str) {
        self.error = Some(PlaybackError { code, message: message.to_string() });
    }

    /// How many times `event` was triggered
    pub fn triggered_count(&self, event: PlayerEvent) -> usize {
        self.triggered.iter().filter(|e| **e == event).count()
    }

    fn load(&mut self, url: &str) {
        self.current_src = url.to_string();
        self.load_history.push(url.to_string());
        self.ready_state = ReadyState::HaveNothing;
        self.error = None;
        self.current_time = 0.0;
        self.duration = f64::NAN;
        self.paused = true;
    }
}

impl Default for VideoElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaPlayer for VideoElement {
    fn current_src(&self) -> &str {
        &self.current_src
    }

    fn set_src(&mut self, url: &str) {
        self.sources.clear();
        self.load(url);
    }

    fn set_sources(&mut self, sources: &[SourceEntry]) {
        self.sources = sources.to_vec();
        let chosen = sources.iter().find(|s| s.selected).or_else(|| sources.first());
        match chosen {
            Some(source) => {
                let url = source.src.clone();
                self.load(&url);
            }
            None => {
                self.current_src.clear();
                self.ready_state = ReadyState::HaveNothing;
            }
        }
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        // Until metadata arrives the duration is only a guess
        let known = self.ready_state >= ReadyState::HaveMetadata && self.duration.is_finite();
        self.current_time = if known {
            seconds.min(self.duration)
        } else {
            seconds
        };
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.disposed {
            return Err(PlaybackError {
                code: PlaybackErrorCode::Aborted,
                message: "Player disposed".into(),
            });
        }
        if self.current_src.is_empty() {
            return Err(PlaybackError {
                code: PlaybackErrorCode::SrcNotSupported,
                message: "No source".into(),
            });
        }
        self.paused = false;
        Ok(())
    }

    fn trigger(&mut self, event: PlayerEvent) {
        self.triggered.push(event);
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.paused = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl PlayabilityProbe for VideoElement {
    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        if let Some(answer) = self.support.get(mime_type) {
            return *answer;
        }
        // Bare container types only; anything carrying a codecs= list is unknown
        match mime_type {
            "video/mp4" | "video/webm" => CanPlayType::Maybe,
            _ => CanPlayType::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(src: &str, label: &str, selected: bool) -> SourceEntry {
        SourceEntry {
            src: src.into(),
            mime_type: "video/mp4".into(),
            label: label.into(),
            selected,
        }
    }

    #[test]
    fn test_video_element() {
        let video = VideoElement::new();
        assert!(video.paused);
        assert!(video.duration.is_nan());
        assert!(!video.is_disposed());
    }

    #[test]
    fn test_set_sources_picks_selected() {
        let mut video = VideoElement::new();
        video.set_sources(&[entry("a.mp4", "720p", false), entry("b.mp4", "Original", true)]);
        assert_eq!(video.current_src(), "b.mp4");
        assert_eq!(video.ready_state, ReadyState::HaveNothing);
    }

    #[test]
    fn test_set_sources_without_selection_uses_first() {
        let mut video = VideoElement::new();
        video.set_sources(&[entry("a.mp4", "720p", false), entry("b.mp4", "1080p", false)]);
        assert_eq!(video.current_src(), "a.mp4");
    }

    #[test]
    fn test_seek_without_metadata_does_not_clamp() {
        let mut video = VideoElement::new();
        video.set_src("a.mp4");
        video.set_duration(20.0);
        video.set_current_time(42.0);
        assert_eq!(video.current_time(), 42.0);

        video.load_metadata(30.0);
        video.set_current_time(42.0);
        assert_eq!(video.current_time(), 30.0);
    }

    #[test]
    fn test_play_requires_source() {
        let mut video = VideoElement::new();
        let err = video.play().unwrap_err();
        assert_eq!(err.code, PlaybackErrorCode::SrcNotSupported);

        video.set_src("a.mp4");
        assert!(video.play().is_ok());
        assert!(!video.paused);
    }

    #[test]
    fn test_can_play_type() {
        let video = VideoElement::new().with_support("video/mp2t", CanPlayType::Probably);
        assert_eq!(video.can_play_type("video/mp4"), CanPlayType::Maybe);
        assert_eq!(video.can_play_type("video/mp2t"), CanPlayType::Probably);
        assert_eq!(video.can_play_type("video/unknown"), CanPlayType::Empty);
    }
}
