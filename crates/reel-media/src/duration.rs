//! Duration Override
//!
//! Some containers report a wrong (or no) duration until they are fully read.
//! `HintedPlayer` wraps the real player and answers duration reads from an
//! externally supplied hint while letting writes reach the player untouched.

use crate::element::{MediaPlayer, PlaybackError, PlayerEvent, SourceEntry};

/// Player decorator carrying an optional duration hint
#[derive(Debug)]
pub struct HintedPlayer<P> {
    inner: P,
    hint: Option<f64>,
}

impl<P: MediaPlayer> HintedPlayer<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, hint: None }
    }

    /// Start answering duration reads with `hint`.
    ///
    /// A hint that is not finite and positive clears any active override
    /// instead. Re-applying replaces the previous hint.
    pub fn apply_duration_hint(&mut self, hint: f64) {
        if !(hint.is_finite() && hint > 0.0) {
            self.clear_duration_hint();
            return;
        }
        tracing::debug!("Applying duration hint {}s", hint);
        self.hint = Some(hint);
        self.inner.trigger(PlayerEvent::DurationChange);
        self.inner.trigger(PlayerEvent::TimeUpdate);
    }

    /// Go back to the player's own duration
    pub fn clear_duration_hint(&mut self) {
        if self.hint.take().is_some() {
            tracing::debug!("Cleared duration hint");
            self.inner.trigger(PlayerEvent::DurationChange);
        }
    }

    pub fn duration_hint(&self) -> Option<f64> {
        self.hint
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    /// Tear the shim down and hand back the bare player
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: MediaPlayer> MediaPlayer for HintedPlayer<P> {
    fn current_src(&self) -> &str {
        self.inner.current_src()
    }

    fn set_src(&mut self, url: &str) {
        self.inner.set_src(url);
    }

    fn set_sources(&mut self, sources: &[SourceEntry]) {
        self.inner.set_sources(sources);
    }

    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.inner.set_current_time(seconds);
    }

    fn duration(&self) -> f64 {
        self.hint.unwrap_or_else(|| self.inner.duration())
    }

    fn set_duration(&mut self, seconds: f64) {
        self.inner.set_duration(seconds);
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.inner.play()
    }

    fn trigger(&mut self, event: PlayerEvent) {
        self.inner.trigger(event);
    }

    fn dispose(&mut self) {
        self.clear_duration_hint();
        self.inner.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::VideoElement;

    fn loaded(duration: f64) -> HintedPlayer<VideoElement> {
        let mut video = VideoElement::new();
        video.set_src("clip.webm");
        video.load_metadata(duration);
        HintedPlayer::new(video)
    }

    #[test]
    fn test_hint_answers_reads() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        assert_eq!(player.duration(), 90.0);
        assert_eq!(player.inner().duration, 12.0);
    }

    #[test]
    fn test_writes_pass_through() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        player.set_duration(45.0);

        assert_eq!(player.inner().duration, 45.0);
        assert_eq!(player.duration(), 90.0);
    }

    #[test]
    fn test_clear_restores_original() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        player.clear_duration_hint();
        assert_eq!(player.duration(), 12.0);
        assert_eq!(player.duration_hint(), None);
    }

    #[test]
    fn test_reapply_does_not_nest() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        player.apply_duration_hint(60.0);
        assert_eq!(player.duration(), 60.0);

        player.clear_duration_hint();
        assert_eq!(player.duration(), 12.0);
    }

    #[test]
    fn test_apply_notifies_controls() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        assert_eq!(player.inner().triggered_count(PlayerEvent::DurationChange), 1);
        assert_eq!(player.inner().triggered_count(PlayerEvent::TimeUpdate), 1);

        player.clear_duration_hint();
        assert_eq!(player.inner().triggered_count(PlayerEvent::DurationChange), 2);
    }

    #[test]
    fn test_invalid_hint_clears() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        player.apply_duration_hint(f64::INFINITY);
        assert_eq!(player.duration(), 12.0);

        player.apply_duration_hint(-3.0);
        player.apply_duration_hint(0.0);
        assert_eq!(player.duration_hint(), None);
        // Clearing an inactive override is silent
        assert_eq!(player.inner().triggered_count(PlayerEvent::DurationChange), 2);
    }

    #[test]
    fn test_dispose_tears_down_hint() {
        let mut player = loaded(12.0);
        player.apply_duration_hint(90.0);
        player.dispose();
        assert!(player.is_disposed());
        assert_eq!(player.duration_hint(), None);
    }
}
