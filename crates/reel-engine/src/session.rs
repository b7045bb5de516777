//! Player Session
//!
//! Binds one embedded player to a [`FallbackEngine`], a capability client and
//! the duration shim. Events are fed in by whatever dispatches the player's
//! events; the only await point is the capability check.
//!
//! Everything runs on one thread. State sits behind `Rc<RefCell<_>>` and no
//! borrow is held across an await.

use std::cell::RefCell;
use std::rc::Rc;

use reel_media::{HintedPlayer, MediaPlayer, PlayerEvent, SourceEntry};
use reel_net::CapabilityClient;

use crate::advisory::FailedCodecRecord;
use crate::config::{SessionOptions, SEEK_TOLERANCE_SECONDS};
use crate::fallback::{CapabilityFlag, Decision, FallbackEngine, FallbackState};
use crate::store::SessionStore;

/// Position to restore on the next `loadedmetadata`
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSeek {
    position: f64,
    resume: bool,
}

struct SessionState<P> {
    player: HintedPlayer<P>,
    engine: FallbackEngine,
    options: SessionOptions,
    pending_seek: Option<PendingSeek>,
    start_seek_pending: bool,
    start_play_pending: bool,
    disposed: bool,
    time_listener: Option<Box<dyn FnMut(f64)>>,
}

impl<P: MediaPlayer> SessionState<P> {
    fn apply(&mut self, decision: Decision) {
        match decision {
            Decision::Advance { url, .. } => {
                // A source that failed before its metadata never moved the
                // position, so the one captured earlier still stands
                let position = match self.pending_seek {
                    Some(seek) => seek.position,
                    None => match self.options.start_time {
                        Some(start) if self.start_seek_pending => start,
                        _ => self.player.current_time(),
                    },
                };
                self.player.set_src(&url);
                self.pending_seek = Some(PendingSeek { position, resume: true });
            }
            Decision::Blocked => {
                tracing::debug!("Fallback disabled by backend, leaving error to the player");
            }
            Decision::Ignored
            | Decision::Coalesced
            | Decision::CheckCapability
            | Decision::Deferred
            | Decision::Exhausted => {}
        }
    }

    fn on_loaded_metadata(&mut self) {
        self.engine.on_source_ready();
        let start_seek_pending = std::mem::take(&mut self.start_seek_pending);

        if let Some(seek) = self.pending_seek.take() {
            self.player.set_current_time(seek.position);
            if seek.resume {
                if let Err(e) = self.player.play() {
                    tracing::debug!("Resume after source swap refused: {}", e.message);
                }
            }
            return;
        }

        if start_seek_pending {
            if let Some(start) = self.options.start_time {
                self.player.set_current_time(start);
            }
        }
    }

    fn on_play(&mut self) {
        if !self.start_play_pending {
            return;
        }
        self.start_play_pending = false;
        // Autoplay may have been blocked, so metadata-time seeking never ran
        if let Some(start) = self.options.start_time {
            if (self.player.current_time() - start).abs() > SEEK_TOLERANCE_SECONDS {
                self.player.set_current_time(start);
            }
        }
    }

    fn on_ready(&mut self) {
        if self.player.duration_hint().is_some() {
            self.player.trigger(PlayerEvent::DurationChange);
        }
        if self.options.autoplay {
            if let Err(e) = self.player.play() {
                tracing::debug!("Autoplay refused: {}", e.message);
            }
        }
    }

    fn on_time_update(&mut self) {
        let now = self.player.current_time();
        if let Some(listener) = self.time_listener.as_mut() {
            listener(if now.is_finite() { now } else { 0.0 });
        }
    }
}

/// One player instance with codec fallback
pub struct PlayerSession<P, C> {
    state: Rc<RefCell<SessionState<P>>>,
    client: Rc<C>,
    base_url: Rc<str>,
}

impl<P, C> Clone for PlayerSession<P, C> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            client: Rc::clone(&self.client),
            base_url: Rc::clone(&self.base_url),
        }
    }
}

impl<P: MediaPlayer, C: CapabilityClient> PlayerSession<P, C> {
    /// Wrap `player`. `base_url` is the backend origin the capability check
    /// goes to; `store` holds the tab's failed-codec record.
    pub fn new(
        player: P,
        client: Rc<C>,
        store: Rc<dyn SessionStore>,
        base_url: &str,
        options: SessionOptions,
    ) -> Self {
        let mut player = HintedPlayer::new(player);
        if let Some(hint) = options.duration_hint {
            player.apply_duration_hint(hint);
        }

        let state = SessionState {
            player,
            engine: FallbackEngine::new(FailedCodecRecord::new(store)),
            start_seek_pending: options.start_time.is_some(),
            start_play_pending: options.start_time.is_some(),
            options,
            pending_seek: None,
            disposed: false,
            time_listener: None,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
            client,
            base_url: Rc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Hand the player a new set of sources.
    ///
    /// A list that already contains the playing source is a no-op. Otherwise
    /// negotiation starts over and, if something was playing, its position is
    /// restored once the new source's metadata arrives.
    pub fn load_sources(&self, sources: &[SourceEntry]) {
        if sources.is_empty() {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return;
        }

        let current = state.player.current_src().to_string();
        if sources.iter().any(|s| s.src == current) {
            return;
        }

        state.engine.reset();
        if !current.is_empty() {
            let position = state.player.current_time();
            state.pending_seek = Some(PendingSeek { position, resume: false });
        }
        tracing::info!("Loading {} source(s)", sources.len());
        state.player.set_sources(sources);
    }

    /// Set or clear the duration hint
    pub fn set_duration_hint(&self, hint: Option<f64>) {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return;
        }
        state.options.duration_hint = hint;
        match hint {
            Some(hint) => state.player.apply_duration_hint(hint),
            None => state.player.clear_duration_hint(),
        }
    }

    /// Called with the playback position on every `timeupdate`
    pub fn on_time_update(&self, listener: impl FnMut(f64) + 'static) {
        self.state.borrow_mut().time_listener = Some(Box::new(listener));
    }

    /// Dispatch one player event
    pub async fn handle_event(&self, event: PlayerEvent) {
        if self.is_disposed() {
            return;
        }
        match event {
            PlayerEvent::Error => self.on_error().await,
            PlayerEvent::LoadedMetadata => self.state.borrow_mut().on_loaded_metadata(),
            PlayerEvent::Play => self.state.borrow_mut().on_play(),
            PlayerEvent::Ready => self.state.borrow_mut().on_ready(),
            PlayerEvent::TimeUpdate => self.state.borrow_mut().on_time_update(),
            PlayerEvent::DurationChange => {}
        }
    }

    async fn on_error(&self) {
        let decision = {
            let mut state = self.state.borrow_mut();
            let current = state.player.current_src().to_string();
            state.engine.on_error(&current)
        };

        if decision != Decision::CheckCapability {
            self.state.borrow_mut().apply(decision);
            return;
        }

        tracing::debug!("Checking backend capability at {}", self.base_url);
        let result = self.client.transcoding_enabled(&self.base_url).await;

        let mut state = self.state.borrow_mut();
        if state.disposed || state.player.is_disposed() {
            tracing::debug!("Player disposed during capability check");
            state.disposed = true;
            state.time_listener = None;
            state.pending_seek = None;
            return;
        }
        for decision in state.engine.resolve_capability(result) {
            state.apply(decision);
        }
    }

    /// Restore the duration accessor, detach listeners and dispose the player.
    /// Work still in flight becomes a no-op.
    pub fn dispose(&self) {
        let mut state = self.state.borrow_mut();
        if state.disposed {
            return;
        }
        state.disposed = true;
        state.time_listener = None;
        state.pending_seek = None;
        state.engine.reset();
        if !state.player.is_disposed() {
            state.player.dispose();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    pub fn fallback_state(&self) -> FallbackState {
        self.state.borrow().engine.state()
    }

    pub fn capability(&self) -> CapabilityFlag {
        self.state.borrow().engine.capability()
    }

    /// Read access to the wrapped player
    pub fn with_player<R>(&self, f: impl FnOnce(&HintedPlayer<P>) -> R) -> R {
        f(&self.state.borrow().player)
    }

    /// Write access to the wrapped player
    pub fn with_player_mut<R>(&self, f: impl FnOnce(&mut HintedPlayer<P>) -> R) -> R {
        f(&mut self.state.borrow_mut().player)
    }
}
