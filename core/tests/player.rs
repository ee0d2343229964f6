use deskfolio_core::persisted::{MediaKind, PersistedPlayer, PLAYER_SLOT_KEY};
use deskfolio_core::player::{
    MediaBackend, MediaEntry, OpenOutcome, Player, PlayerError, PlayerEvent, RestoreSkip,
    ViewMode,
};
use deskfolio_core::store::{KeyValueStore, MemoryStore};

const PAGE: &str = "/DMC/songs-in-progress.html";

#[derive(Clone, Debug, PartialEq)]
enum Call {
    Attach(u32, u64),
    Play(u64),
    Seek(f64),
    Release,
}

#[derive(Default)]
struct FakeBackend {
    calls: Vec<Call>,
    attached: Option<u32>,
    playing: bool,
    position: f64,
}

impl FakeBackend {
    fn playing_count(&self) -> usize {
        usize::from(self.attached.is_some() && self.playing)
    }
}

impl MediaBackend for FakeBackend {
    fn attach(&mut self, entry: &MediaEntry, generation: u64) {
        self.calls.push(Call::Attach(entry.id, generation));
        self.attached = Some(entry.id);
        self.position = 0.0;
    }

    fn request_play(&mut self, generation: u64) {
        self.calls.push(Call::Play(generation));
        self.playing = true;
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(Call::Seek(seconds));
        self.position = seconds;
    }

    fn position(&self) -> Option<f64> {
        self.attached.map(|_| self.position)
    }

    fn is_playing(&self) -> bool {
        self.attached.is_some() && self.playing
    }

    fn release(&mut self) {
        self.calls.push(Call::Release);
        self.attached = None;
        self.playing = false;
    }
}

fn library() -> Vec<MediaEntry> {
    vec![
        MediaEntry {
            id: 1,
            title: "Demo One".to_string(),
            kind: MediaKind::Audio,
            src: "../public/audio/one.mp3".to_string(),
            artwork: Some("../public/art/one.png".to_string()),
            icon: None,
        },
        MediaEntry {
            id: 2,
            title: "Demo Two".to_string(),
            kind: MediaKind::Audio,
            src: "../public/audio/two.mp3".to_string(),
            artwork: None,
            icon: Some("\u{262e}".to_string()),
        },
        MediaEntry {
            id: 3,
            title: "Clip".to_string(),
            kind: MediaKind::Video,
            src: "../public/videos/clip.mov".to_string(),
            artwork: None,
            icon: None,
        },
    ]
}

fn player_with(store: MemoryStore) -> Player<FakeBackend, MemoryStore> {
    Player::new(PAGE, library(), FakeBackend::default(), store)
}

fn stored_record(player: &Player<FakeBackend, MemoryStore>) -> Option<PersistedPlayer> {
    player
        .store()
        .raw(PLAYER_SLOT_KEY)
        .map(|raw| PersistedPlayer::from_json(raw).unwrap())
}

#[test]
fn open_attaches_persists_and_autoplays() {
    let mut player = player_with(MemoryStore::new());
    assert_eq!(player.open(1), Ok(OpenOutcome::Opened));
    assert!(player.state().is_open());
    assert_eq!(player.state().media_kind(), Some(MediaKind::Audio));
    let generation = player.generation();
    assert_eq!(
        player.backend().calls,
        vec![Call::Attach(1, generation), Call::Play(generation)]
    );
    let record = stored_record(&player).unwrap();
    assert_eq!(record.media_ref, 1);
    assert_eq!(record.playback_position_seconds, 0.0);
    assert_eq!(record.origin_page, PAGE);
}

#[test]
fn switching_releases_previous_before_attaching_next() {
    let mut player = player_with(MemoryStore::new());
    player.open(1).unwrap();
    player.backend_mut().calls.clear();

    assert_eq!(player.open(2), Ok(OpenOutcome::Switched { previous: 1 }));
    let calls = &player.backend().calls;
    let release = calls.iter().position(|call| *call == Call::Release).unwrap();
    let attach = calls
        .iter()
        .position(|call| matches!(call, Call::Attach(2, _)))
        .unwrap();
    assert!(release < attach);
    assert_eq!(player.backend().playing_count(), 1);
    assert_eq!(player.state().active_media_ref(), Some(2));
    assert_eq!(stored_record(&player).unwrap().media_ref, 2);
}

#[test]
fn reopening_the_same_media_is_a_no_op() {
    let mut player = player_with(MemoryStore::new());
    player.open(1).unwrap();
    let generation = player.generation();
    assert_eq!(player.open(1), Ok(OpenOutcome::AlreadyOpen));
    assert_eq!(player.generation(), generation);
    assert_eq!(player.backend().calls.len(), 2);
}

#[test]
fn unknown_media_is_an_error_and_leaves_state_alone() {
    let mut player = player_with(MemoryStore::new());
    assert_eq!(
        player.open(42),
        Err(PlayerError::UnknownMedia { media_ref: 42 })
    );
    assert!(!player.state().is_open());
    assert!(player.backend().calls.is_empty());
}

#[test]
fn close_releases_and_clears_the_slot() {
    let mut player = player_with(MemoryStore::new());
    player.open(3).unwrap();
    player.toggle_minimize();
    assert!(player.close());
    assert!(!player.state().is_open());
    assert_eq!(player.state().view_mode, ViewMode::Normal);
    assert_eq!(player.backend().calls.last(), Some(&Call::Release));
    assert!(player.store().raw(PLAYER_SLOT_KEY).is_none());
    assert!(!player.close());
}

#[test]
fn minimized_and_fullscreen_are_exclusive() {
    let mut player = player_with(MemoryStore::new());
    assert_eq!(player.toggle_minimize(), None);
    player.open(3).unwrap();

    // Deterministic pseudo-random walk over the toggles.
    let mut seed: u32 = 0x9e37_79b9;
    for _ in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        match seed % 3 {
            0 => {
                player.toggle_minimize();
            }
            1 => {
                player.toggle_fullscreen();
            }
            _ => {
                player.open(1 + (seed >> 8) % 3).unwrap();
            }
        }
        let state = player.state();
        assert!(!(state.is_minimized() && state.is_fullscreen()));
    }
}

#[test]
fn minimize_leaves_fullscreen() {
    let mut player = player_with(MemoryStore::new());
    player.open(3).unwrap();
    assert_eq!(player.toggle_fullscreen(), Some(ViewMode::Fullscreen));
    assert_eq!(player.toggle_minimize(), Some(ViewMode::Minimized));
    assert_eq!(player.toggle_minimize(), Some(ViewMode::Normal));
}

#[test]
fn chrome_drag_follows_pointer_and_is_ignored_in_fullscreen() {
    let mut player = player_with(MemoryStore::new());
    assert!(!player.begin_reposition((0.0, 0.0), (0.0, 0.0)));
    player.open(1).unwrap();

    assert!(player.begin_reposition((500.0, 120.0), (300.0, 100.0)));
    assert_eq!(player.reposition((540.0, 150.0)), Some((340.0, 130.0)));
    assert!(player.end_reposition(Some((338.0, 130.0))));
    assert_eq!(player.effective_chrome_position(), Some((338.0, 130.0)));
    assert!(!player.is_repositioning());

    player.toggle_fullscreen();
    assert_eq!(player.effective_chrome_position(), None);
    assert!(!player.begin_reposition((0.0, 0.0), (0.0, 0.0)));
    assert_eq!(player.reposition((10.0, 10.0)), None);

    player.toggle_fullscreen();
    assert_eq!(player.effective_chrome_position(), Some((338.0, 130.0)));
}

#[test]
fn tick_persists_only_while_playing() {
    let mut player = player_with(MemoryStore::new());
    assert!(!player.tick());
    player.open(2).unwrap();
    player.backend_mut().position = 7.5;
    assert!(player.tick());
    assert_eq!(stored_record(&player).unwrap().playback_position_seconds, 7.5);

    player.backend_mut().playing = false;
    player.backend_mut().position = 9.0;
    assert!(!player.tick());
    assert_eq!(stored_record(&player).unwrap().playback_position_seconds, 7.5);

    assert!(player.flush());
    assert_eq!(stored_record(&player).unwrap().playback_position_seconds, 9.0);
}

#[test]
fn persisted_position_restores_after_reload() {
    let mut first = player_with(MemoryStore::new());
    first.open(2).unwrap();
    first.backend_mut().position = 42.25;
    assert!(first.tick());

    let store = first.store().clone();
    let mut reloaded = player_with(store);
    assert_eq!(reloaded.restore(), Some(2));
    assert_eq!(reloaded.state().active_media_ref(), Some(2));
    assert!(reloaded.backend().calls.contains(&Call::Seek(42.25)));
    assert_eq!(reloaded.backend().position().unwrap(), 42.25);
    assert_eq!(reloaded.state().playback_position_seconds, 42.25);
    assert_eq!(
        stored_record(&reloaded).unwrap().playback_position_seconds,
        42.25
    );
    assert!(reloaded
        .drain_events()
        .contains(&PlayerEvent::Restored {
            media_ref: 2,
            position_seconds: 42.25,
        }));
}

#[test]
fn malformed_record_is_a_cold_start() {
    let mut store = MemoryStore::new();
    store.insert_raw(PLAYER_SLOT_KEY, "{\"mediaKind\":\"audio\",");
    let mut player = player_with(store);
    assert_eq!(player.restore(), None);
    assert!(!player.state().is_open());
    assert!(player.backend().calls.is_empty());
    assert!(matches!(
        player.drain_events().as_slice(),
        [PlayerEvent::RestoreSkipped(RestoreSkip::Malformed(_))]
    ));
}

#[test]
fn records_from_other_pages_or_unknown_media_are_skipped() {
    let cases = [
        (PersistedPlayer::new(MediaKind::Audio, 1, 3.0, "/index.html"), "page"),
        (PersistedPlayer::new(MediaKind::Audio, 9, 3.0, PAGE), "media"),
        (PersistedPlayer::new(MediaKind::Video, 1, 3.0, PAGE), "kind"),
    ];
    for (record, label) in cases {
        let mut store = MemoryStore::new();
        store.insert_raw(PLAYER_SLOT_KEY, &record.to_json().unwrap());
        let mut player = player_with(store);
        assert_eq!(player.restore(), None, "{label}");
        assert!(!player.state().is_open(), "{label}");
        assert!(player.store().raw(PLAYER_SLOT_KEY).is_some(), "{label}");
    }
}

#[test]
fn empty_slot_restores_nothing() {
    let mut player = player_with(MemoryStore::new());
    assert_eq!(player.restore(), None);
    assert!(player.drain_events().is_empty());
}

#[test]
fn autoplay_rejection_degrades_to_paused() {
    let mut player = player_with(MemoryStore::new());
    player.open(1).unwrap();
    let generation = player.generation();
    player.drain_events();
    assert!(player.autoplay_settled(generation, false));
    assert!(player.state().is_open());
    assert!(player.state().active.as_ref().unwrap().autoplay_blocked);
    assert_eq!(
        player.drain_events(),
        vec![PlayerEvent::AutoplayBlocked { media_ref: 1 }]
    );
}

#[test]
fn stale_callbacks_are_ignored_after_switch_or_close() {
    let mut player = player_with(MemoryStore::new());
    player.open(1).unwrap();
    let stale = player.generation();
    player.open(2).unwrap();
    assert!(!player.autoplay_settled(stale, false));
    assert!(!player.media_failed(stale, "decode error"));
    assert!(player.state().active.as_ref().unwrap().notice.is_none());

    let current = player.generation();
    player.close();
    assert!(!player.media_failed(current, "decode error"));
}

#[test]
fn media_failure_shows_notice_and_stays_open() {
    let mut player = player_with(MemoryStore::new());
    player.open(3).unwrap();
    let generation = player.generation();
    assert!(player.media_failed(generation, "Could not load Clip"));
    let active = player.state().active.as_ref().unwrap();
    assert_eq!(active.notice.as_deref(), Some("Could not load Clip"));
    assert!(player.state().is_open());
    assert!(player.close());
}

#[test]
fn storage_failures_do_not_break_the_player() {
    let mut store = MemoryStore::new();
    store.set_read_only(true);
    let mut player = player_with(store);
    assert_eq!(player.open(1), Ok(OpenOutcome::Opened));
    assert!(!player.tick());
    assert!(player.close());
    let failures = player
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, PlayerEvent::PersistFailed { .. }))
        .count();
    assert_eq!(failures, 3);
    assert!(player.store().get(PLAYER_SLOT_KEY).unwrap().is_none());
}
