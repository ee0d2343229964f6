pub mod board;
pub mod catalog;
pub mod gesture;
pub mod grid;
pub mod persisted;
pub mod player;
pub mod store;

pub use board::{BoardError, DraggableItem, IconBoard, MoveOutcome, ReleaseOutcome, TargetAction};
pub use catalog::{asset_url, default_page, page_by_slug, PageEntry, SITE_PAGES};
pub use gesture::{CommitMetric, DragPolicy, GestureSession, InputKind, InputKindGate, PolicySet};
pub use grid::{layout_positions, GridMetrics, LayoutMode};
pub use persisted::{MediaKind, PersistedPlayer, RecordError, PLAYER_SLOT_KEY};
pub use player::{
    MediaBackend, MediaEntry, OpenOutcome, Player, PlayerError, PlayerEvent, PlayerState,
    RestoreSkip, ViewMode, PERSIST_INTERVAL_MS,
};
pub use store::{KeyValueStore, MemoryStore, StoreError};
