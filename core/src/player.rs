use std::fmt;

use crate::persisted::{sanitize_position, MediaKind, PersistedPlayer, PLAYER_SLOT_KEY};
use crate::store::{KeyValueStore, StoreError};

pub const PERSIST_INTERVAL_MS: u32 = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct MediaEntry {
    pub id: u32,
    pub title: String,
    pub kind: MediaKind,
    pub src: String,
    pub artwork: Option<String>,
    /// Glyph shown when there is no artwork.
    pub icon: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Normal,
    Minimized,
    Fullscreen,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveMedia {
    pub media_ref: u32,
    pub kind: MediaKind,
    pub title: String,
    pub generation: u64,
    pub autoplay_blocked: bool,
    pub notice: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub active: Option<ActiveMedia>,
    pub view_mode: ViewMode,
    pub chrome_position: Option<(f32, f32)>,
    pub playback_position_seconds: f64,
}

impl PlayerState {
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        self.active.as_ref().map(|active| active.kind)
    }

    pub fn active_media_ref(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.media_ref)
    }

    pub fn is_minimized(&self) -> bool {
        self.view_mode == ViewMode::Minimized
    }

    pub fn is_fullscreen(&self) -> bool {
        self.view_mode == ViewMode::Fullscreen
    }
}

/// The element that actually plays media. Only one is attached at a time.
pub trait MediaBackend {
    /// Builds and attaches the element for `entry`. Asynchronous callbacks
    /// raised by it must carry `generation`.
    fn attach(&mut self, entry: &MediaEntry, generation: u64);
    /// Starts an autoplay attempt; the outcome is reported later through
    /// [`Player::autoplay_settled`].
    fn request_play(&mut self, generation: u64);
    fn seek(&mut self, seconds: f64);
    fn position(&self) -> Option<f64>;
    fn is_playing(&self) -> bool;
    /// Pauses and drops the attached element, if any.
    fn release(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    UnknownMedia { media_ref: u32 },
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::UnknownMedia { media_ref } => {
                write!(f, "media {media_ref} is not in this page's library")
            }
        }
    }
}

impl std::error::Error for PlayerError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    Switched { previous: u32 },
    AlreadyOpen,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RestoreSkip {
    Unreadable(StoreError),
    Malformed(String),
    OtherPage(String),
    UnknownMedia(u32),
    KindMismatch(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlayerEvent {
    Opened { media_ref: u32, generation: u64 },
    Switched { from: u32, to: u32 },
    Closed { media_ref: u32 },
    Restored { media_ref: u32, position_seconds: f64 },
    RestoreSkipped(RestoreSkip),
    AutoplayBlocked { media_ref: u32 },
    MediaFailed { media_ref: u32, message: String },
    PersistFailed { reason: String },
}

#[derive(Clone, Copy, Debug)]
struct ChromeDrag {
    pointer_origin: (f32, f32),
    box_origin: (f32, f32),
}

pub struct Player<B, S> {
    page: String,
    library: Vec<MediaEntry>,
    backend: B,
    store: S,
    state: PlayerState,
    chrome_drag: Option<ChromeDrag>,
    generation: u64,
    events: Vec<PlayerEvent>,
}

impl<B: MediaBackend, S: KeyValueStore> Player<B, S> {
    pub fn new(page: &str, library: Vec<MediaEntry>, backend: B, store: S) -> Self {
        Self {
            page: page.to_string(),
            library,
            backend,
            store,
            state: PlayerState::default(),
            chrome_drag: None,
            generation: 0,
            events: Vec::new(),
        }
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn library(&self) -> &[MediaEntry] {
        &self.library
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.state.is_open() && generation == self.generation
    }

    pub fn entry(&self, media_ref: u32) -> Option<&MediaEntry> {
        self.library.iter().find(|entry| entry.id == media_ref)
    }

    pub fn drain_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn open(&mut self, media_ref: u32) -> Result<OpenOutcome, PlayerError> {
        let Some(entry) = self.entry(media_ref).cloned() else {
            return Err(PlayerError::UnknownMedia { media_ref });
        };
        let previous = self.state.active_media_ref();
        if previous == Some(media_ref) {
            return Ok(OpenOutcome::AlreadyOpen);
        }
        if previous.is_some() {
            self.backend.release();
        }
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.chrome_drag = None;
        self.state.active = Some(ActiveMedia {
            media_ref,
            kind: entry.kind,
            title: entry.title.clone(),
            generation,
            autoplay_blocked: false,
            notice: None,
        });
        self.state.view_mode = ViewMode::Normal;
        self.state.playback_position_seconds = 0.0;
        self.backend.attach(&entry, generation);
        self.persist(0.0);
        self.backend.request_play(generation);
        self.events.push(PlayerEvent::Opened {
            media_ref,
            generation,
        });
        match previous {
            Some(from) => {
                self.events.push(PlayerEvent::Switched { from, to: media_ref });
                Ok(OpenOutcome::Switched { previous: from })
            }
            None => Ok(OpenOutcome::Opened),
        }
    }

    pub fn close(&mut self) -> bool {
        let Some(active) = self.state.active.take() else {
            return false;
        };
        self.backend.release();
        self.generation = self.generation.wrapping_add(1);
        self.chrome_drag = None;
        self.state.view_mode = ViewMode::Normal;
        self.state.playback_position_seconds = 0.0;
        if let Err(err) = self.store.remove(PLAYER_SLOT_KEY) {
            self.events.push(PlayerEvent::PersistFailed {
                reason: err.to_string(),
            });
        }
        self.events.push(PlayerEvent::Closed {
            media_ref: active.media_ref,
        });
        true
    }

    pub fn toggle_minimize(&mut self) -> Option<ViewMode> {
        if !self.state.is_open() {
            return None;
        }
        self.state.view_mode = match self.state.view_mode {
            ViewMode::Minimized => ViewMode::Normal,
            ViewMode::Normal | ViewMode::Fullscreen => ViewMode::Minimized,
        };
        Some(self.state.view_mode)
    }

    pub fn toggle_fullscreen(&mut self) -> Option<ViewMode> {
        if !self.state.is_open() {
            return None;
        }
        self.state.view_mode = match self.state.view_mode {
            ViewMode::Fullscreen => ViewMode::Normal,
            ViewMode::Normal | ViewMode::Minimized => {
                self.chrome_drag = None;
                ViewMode::Fullscreen
            }
        };
        Some(self.state.view_mode)
    }

    /// Chrome position to apply; the stored override is kept but ignored
    /// while fullscreen.
    pub fn effective_chrome_position(&self) -> Option<(f32, f32)> {
        if self.state.is_fullscreen() {
            None
        } else {
            self.state.chrome_position
        }
    }

    pub fn is_repositioning(&self) -> bool {
        self.chrome_drag.is_some()
    }

    /// `rendered_origin` is the chrome's current on-screen top-left corner.
    pub fn begin_reposition(&mut self, pointer: (f32, f32), rendered_origin: (f32, f32)) -> bool {
        if !self.state.is_open() || self.state.is_fullscreen() {
            return false;
        }
        self.chrome_drag = Some(ChromeDrag {
            pointer_origin: pointer,
            box_origin: rendered_origin,
        });
        self.state.chrome_position = Some(rendered_origin);
        true
    }

    pub fn reposition(&mut self, pointer: (f32, f32)) -> Option<(f32, f32)> {
        if self.state.is_fullscreen() {
            return None;
        }
        let drag = self.chrome_drag?;
        let position = (
            drag.box_origin.0 + pointer.0 - drag.pointer_origin.0,
            drag.box_origin.1 + pointer.1 - drag.pointer_origin.1,
        );
        self.state.chrome_position = Some(position);
        Some(position)
    }

    pub fn end_reposition(&mut self, rendered_origin: Option<(f32, f32)>) -> bool {
        if self.chrome_drag.take().is_none() {
            return false;
        }
        if let Some(origin) = rendered_origin {
            self.state.chrome_position = Some(origin);
        }
        true
    }

    /// Periodic checkpoint; only writes while media is actually playing.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_open() || !self.backend.is_playing() {
            return false;
        }
        self.checkpoint()
    }

    /// Checkpoint on page unload.
    pub fn flush(&mut self) -> bool {
        if !self.state.is_open() {
            return false;
        }
        self.checkpoint()
    }

    /// Reopens the media saved for this page and seeks to the saved
    /// position. Anything unusable in the slot counts as a cold start.
    pub fn restore(&mut self) -> Option<u32> {
        let raw = match self.store.get(PLAYER_SLOT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                self.skip_restore(RestoreSkip::Unreadable(err));
                return None;
            }
        };
        let record = match PersistedPlayer::from_json(&raw) {
            Ok(record) => record,
            Err(err) => {
                self.skip_restore(RestoreSkip::Malformed(err.to_string()));
                return None;
            }
        };
        if record.origin_page != self.page {
            self.skip_restore(RestoreSkip::OtherPage(record.origin_page));
            return None;
        }
        let Some(entry) = self.entry(record.media_ref) else {
            self.skip_restore(RestoreSkip::UnknownMedia(record.media_ref));
            return None;
        };
        if entry.kind != record.media_kind {
            self.skip_restore(RestoreSkip::KindMismatch(record.media_ref));
            return None;
        }
        if self.open(record.media_ref).is_err() {
            return None;
        }
        let position = record.playback_position_seconds;
        if position > 0.0 {
            self.backend.seek(position);
        }
        self.state.playback_position_seconds = position;
        self.persist(position);
        self.events.push(PlayerEvent::Restored {
            media_ref: record.media_ref,
            position_seconds: position,
        });
        Some(record.media_ref)
    }

    /// Outcome of the autoplay attempt started by `open`. Stale generations
    /// are ignored.
    pub fn autoplay_settled(&mut self, generation: u64, played: bool) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let Some(active) = self.state.active.as_mut() else {
            return false;
        };
        active.autoplay_blocked = !played;
        if !played {
            self.events.push(PlayerEvent::AutoplayBlocked {
                media_ref: active.media_ref,
            });
        }
        true
    }

    /// Load or decode failure of the attached element. The player stays open
    /// and shows `message` until closed.
    pub fn media_failed(&mut self, generation: u64, message: &str) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        let Some(active) = self.state.active.as_mut() else {
            return false;
        };
        active.notice = Some(message.to_string());
        self.events.push(PlayerEvent::MediaFailed {
            media_ref: active.media_ref,
            message: message.to_string(),
        });
        true
    }

    fn checkpoint(&mut self) -> bool {
        let position = self
            .backend
            .position()
            .map(sanitize_position)
            .unwrap_or(self.state.playback_position_seconds);
        self.state.playback_position_seconds = position;
        self.persist(position)
    }

    fn persist(&mut self, position: f64) -> bool {
        let Some(record) = self
            .state
            .active
            .as_ref()
            .map(|active| PersistedPlayer::new(active.kind, active.media_ref, position, &self.page))
        else {
            return false;
        };
        let result = record
            .to_json()
            .map_err(|err| err.to_string())
            .and_then(|raw| {
                self.store
                    .set(PLAYER_SLOT_KEY, &raw)
                    .map_err(|err| err.to_string())
            });
        match result {
            Ok(()) => true,
            Err(reason) => {
                self.events.push(PlayerEvent::PersistFailed { reason });
                false
            }
        }
    }

    fn skip_restore(&mut self, reason: RestoreSkip) {
        self.events.push(PlayerEvent::RestoreSkipped(reason));
    }
}
