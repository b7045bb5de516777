//! Session Configuration

/// How far (seconds) the player may drift from the requested start time
/// before a manual play re-seeks
pub const SEEK_TOLERANCE_SECONDS: f64 = 0.5;

/// Per-player options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOptions {
    /// Seek here once the first metadata arrives
    pub start_time: Option<f64>,

    /// Duration to report instead of the player's own
    pub duration_hint: Option<f64>,

    /// Start playing as soon as the player is ready
    pub autoplay: bool,
}

impl SessionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_time(mut self, seconds: f64) -> Self {
        self.start_time = Some(seconds);
        self
    }

    pub fn duration_hint(mut self, seconds: f64) -> Self {
        self.duration_hint = Some(seconds);
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}
