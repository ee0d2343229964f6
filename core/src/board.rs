use std::collections::HashSet;
use std::fmt;

use crate::gesture::{GestureSession, InputKind, InputKindGate, PolicySet};
use crate::grid::{layout_positions, GridMetrics};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetAction {
    Navigate(String),
    OpenMedia(u32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct DraggableItem {
    pub id: u32,
    pub title: String,
    pub image: String,
    pub action: TargetAction,
    pub position: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    DuplicateItem { id: u32 },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::DuplicateItem { id } => write!(f, "duplicate item id {id}"),
        }
    }
}

impl std::error::Error for BoardError {}

#[derive(Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    /// No session is live.
    Idle,
    /// Still below the commit threshold.
    Pending { suppress_default: bool },
    Dragged { id: u32, position: (f32, f32) },
}

impl MoveOutcome {
    pub fn suppress_default(&self) -> bool {
        match self {
            MoveOutcome::Idle => false,
            MoveOutcome::Pending { suppress_default } => *suppress_default,
            MoveOutcome::Dragged { .. } => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReleaseOutcome {
    Idle,
    Tap {
        id: u32,
        action: TargetAction,
        held_ms: f64,
    },
    Dropped {
        id: u32,
        position: (f32, f32),
        held_ms: f64,
    },
}

impl ReleaseOutcome {
    /// Item whose dragging state must be cleared.
    pub fn item_id(&self) -> Option<u32> {
        match self {
            ReleaseOutcome::Idle => None,
            ReleaseOutcome::Tap { id, .. } | ReleaseOutcome::Dropped { id, .. } => Some(*id),
        }
    }
}

/// Icon set of one page together with its single live gesture session.
pub struct IconBoard {
    items: Vec<DraggableItem>,
    session: Option<GestureSession>,
    policies: PolicySet,
    gate: InputKindGate,
    metrics: GridMetrics,
}

impl IconBoard {
    pub fn new(items: Vec<DraggableItem>, policies: PolicySet) -> Result<Self, BoardError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(BoardError::DuplicateItem { id: item.id });
            }
        }
        Ok(Self {
            items,
            session: None,
            policies,
            gate: InputKindGate::new(),
            metrics: GridMetrics::default(),
        })
    }

    pub fn with_metrics(mut self, metrics: GridMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_gate(mut self, gate: InputKindGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn items(&self) -> &[DraggableItem] {
        &self.items
    }

    pub fn item(&self, id: u32) -> Option<&DraggableItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    pub fn policies(&self) -> PolicySet {
        self.policies
    }

    pub fn active_id(&self) -> Option<u32> {
        self.session.map(|session| session.item_id())
    }

    pub fn is_dragging(&self) -> bool {
        self.session.map(|session| session.is_dragging()).unwrap_or(false)
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn relayout(&mut self, viewport_width: f32, viewport_height: f32) {
        let positions = layout_positions(
            self.items.len(),
            viewport_width,
            viewport_height,
            &self.metrics,
        );
        for (item, position) in self.items.iter_mut().zip(positions) {
            item.position = position;
        }
    }

    /// Opens a session on `id`. Refused when the id is unknown, another
    /// session is live, or the input kind gate rejects the press.
    pub fn press(&mut self, id: u32, kind: InputKind, point: (f32, f32), now_ms: f64) -> bool {
        if self.session.is_some() || self.item(id).is_none() {
            return false;
        }
        if !self.gate.accept(kind, now_ms) {
            return false;
        }
        let policy = self.policies.for_kind(kind);
        self.session = Some(GestureSession::begin(id, kind, policy, point, now_ms));
        true
    }

    pub fn motion(&mut self, point: (f32, f32)) -> MoveOutcome {
        let Some(session) = self.session.as_mut() else {
            return MoveOutcome::Idle;
        };
        let id = session.item_id();
        let step = session.advance(point);
        let Some((dx, dy)) = step.delta else {
            return MoveOutcome::Pending {
                suppress_default: step.suppress_default,
            };
        };
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return MoveOutcome::Pending {
                suppress_default: step.suppress_default,
            };
        };
        item.position = (item.position.0 + dx, item.position.1 + dy);
        MoveOutcome::Dragged {
            id,
            position: item.position,
        }
    }

    pub fn release(&mut self, now_ms: f64) -> ReleaseOutcome {
        let Some(session) = self.session.take() else {
            return ReleaseOutcome::Idle;
        };
        let end = session.finish(now_ms);
        let Some(item) = self.item(end.item_id) else {
            return ReleaseOutcome::Idle;
        };
        if end.tapped {
            ReleaseOutcome::Tap {
                id: end.item_id,
                action: item.action.clone(),
                held_ms: end.held_ms,
            }
        } else {
            ReleaseOutcome::Dropped {
                id: end.item_id,
                position: item.position,
                held_ms: end.held_ms,
            }
        }
    }

    /// Ends the live session without firing its action.
    pub fn cancel(&mut self) -> Option<u32> {
        self.session.take().map(|session| session.item_id())
    }
}
