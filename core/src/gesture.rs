pub const JITTER_THRESHOLD_PX: f32 = 5.0;
pub const TOUCH_COMMIT_PX: f32 = 5.0;
pub const MOUSE_COMMIT_PX: f32 = 15.0;
pub const INPUT_KIND_COOLDOWN_MS: f64 = 2000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Mouse,
    Touch,
}

/// How a deferred session measures movement against its commit threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitMetric {
    /// Sum over moves of the distance from the press point.
    Distance,
    /// Largest single-axis displacement from the press point.
    Axis,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragPolicy {
    /// Commits once the pointer leaves the jitter box around the press point,
    /// then follows incremental deltas. Default handling is suppressed for
    /// the whole session.
    Immediate { threshold: f32 },
    /// Holds the item still until movement exceeds `threshold`; on commit the
    /// item catches up with the pointer. Default handling stays enabled until
    /// the commit.
    Deferred { threshold: f32, metric: CommitMetric },
}

impl DragPolicy {
    pub const fn immediate() -> Self {
        DragPolicy::Immediate {
            threshold: JITTER_THRESHOLD_PX,
        }
    }

    pub const fn deferred_touch() -> Self {
        DragPolicy::Deferred {
            threshold: TOUCH_COMMIT_PX,
            metric: CommitMetric::Distance,
        }
    }

    pub const fn deferred_mouse() -> Self {
        DragPolicy::Deferred {
            threshold: MOUSE_COMMIT_PX,
            metric: CommitMetric::Axis,
        }
    }

    pub fn threshold(&self) -> f32 {
        match self {
            DragPolicy::Immediate { threshold } => *threshold,
            DragPolicy::Deferred { threshold, .. } => *threshold,
        }
    }

    /// Whether the press itself should already cancel scrolling and selection.
    pub fn suppresses_on_press(&self) -> bool {
        matches!(self, DragPolicy::Immediate { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicySet {
    pub mouse: DragPolicy,
    pub touch: DragPolicy,
}

impl PolicySet {
    pub fn for_kind(&self, kind: InputKind) -> DragPolicy {
        match kind {
            InputKind::Mouse => self.mouse,
            InputKind::Touch => self.touch,
        }
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            mouse: DragPolicy::immediate(),
            touch: DragPolicy::deferred_touch(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStep {
    /// Offset to add to the item position, present once the session drags.
    pub delta: Option<(f32, f32)>,
    pub suppress_default: bool,
    pub committed_now: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionEnd {
    pub item_id: u32,
    pub tapped: bool,
    pub held_ms: f64,
}

/// One pointer interaction from press to release.
#[derive(Clone, Copy, Debug)]
pub struct GestureSession {
    item_id: u32,
    kind: InputKind,
    policy: DragPolicy,
    origin: (f32, f32),
    last: (f32, f32),
    dragging: bool,
    accumulated: f32,
    started_ms: f64,
}

impl GestureSession {
    pub fn begin(
        item_id: u32,
        kind: InputKind,
        policy: DragPolicy,
        point: (f32, f32),
        now_ms: f64,
    ) -> Self {
        Self {
            item_id,
            kind,
            policy,
            origin: point,
            last: point,
            dragging: false,
            accumulated: 0.0,
            started_ms: now_ms,
        }
    }

    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Movement summed by the distance metric so far.
    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    pub fn advance(&mut self, point: (f32, f32)) -> SessionStep {
        let step = (point.0 - self.last.0, point.1 - self.last.1);
        self.last = point;
        if self.dragging {
            return SessionStep {
                delta: Some(step),
                suppress_default: true,
                committed_now: false,
            };
        }
        let measure = match self.policy {
            DragPolicy::Immediate { .. } => axis_displacement(self.origin, point),
            DragPolicy::Deferred {
                metric: CommitMetric::Distance,
                ..
            } => {
                // Each pending move adds its distance from the press point.
                let (dx, dy) = (point.0 - self.origin.0, point.1 - self.origin.1);
                self.accumulated += (dx * dx + dy * dy).sqrt();
                self.accumulated
            }
            DragPolicy::Deferred {
                metric: CommitMetric::Axis,
                ..
            } => axis_displacement(self.origin, point),
        };
        if measure <= self.policy.threshold() {
            return SessionStep {
                delta: None,
                suppress_default: self.policy.suppresses_on_press(),
                committed_now: false,
            };
        }
        self.dragging = true;
        let delta = match self.policy {
            DragPolicy::Immediate { .. } => step,
            DragPolicy::Deferred { .. } => (point.0 - self.origin.0, point.1 - self.origin.1),
        };
        SessionStep {
            delta: Some(delta),
            suppress_default: true,
            committed_now: true,
        }
    }

    pub fn finish(self, now_ms: f64) -> SessionEnd {
        SessionEnd {
            item_id: self.item_id,
            tapped: !self.dragging,
            held_ms: (now_ms - self.started_ms).max(0.0),
        }
    }
}

fn axis_displacement(origin: (f32, f32), point: (f32, f32)) -> f32 {
    (point.0 - origin.0).abs().max((point.1 - origin.1).abs())
}

/// Rejects a press of one input kind shortly after a press of the other, so
/// the compatibility mouse events a browser emits after a touch tap cannot
/// start a second session.
#[derive(Clone, Copy, Debug)]
pub struct InputKindGate {
    last_kind: Option<InputKind>,
    last_ms: f64,
    cooldown_ms: f64,
}

impl InputKindGate {
    pub fn new() -> Self {
        Self::with_cooldown(INPUT_KIND_COOLDOWN_MS)
    }

    pub fn with_cooldown(cooldown_ms: f64) -> Self {
        Self {
            last_kind: None,
            last_ms: 0.0,
            cooldown_ms,
        }
    }

    pub fn accept(&mut self, kind: InputKind, now_ms: f64) -> bool {
        if let Some(last) = self.last_kind {
            if last != kind && (now_ms - self.last_ms) < self.cooldown_ms {
                return false;
            }
        }
        self.last_kind = Some(kind);
        self.last_ms = now_ms;
        true
    }
}

impl Default for InputKindGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_blocks_synthetic_mouse_after_touch() {
        let mut gate = InputKindGate::new();
        assert!(gate.accept(InputKind::Touch, 100.0));
        assert!(!gate.accept(InputKind::Mouse, 400.0));
        assert!(gate.accept(InputKind::Touch, 500.0));
        assert!(gate.accept(InputKind::Mouse, 500.0 + INPUT_KIND_COOLDOWN_MS));
    }

    #[test]
    fn axis_metric_ignores_diagonal_under_threshold() {
        let mut session = GestureSession::begin(
            1,
            InputKind::Mouse,
            DragPolicy::deferred_mouse(),
            (0.0, 0.0),
            0.0,
        );
        let step = session.advance((10.0, 10.0));
        assert_eq!(step.delta, None);
        assert!(!step.suppress_default);
        let step = session.advance((16.0, 2.0));
        assert!(step.committed_now);
        assert_eq!(step.delta, Some((16.0, 2.0)));
    }

    #[test]
    fn distance_metric_sums_offsets_from_press_point() {
        let mut session = GestureSession::begin(
            1,
            InputKind::Touch,
            DragPolicy::deferred_touch(),
            (0.0, 0.0),
            0.0,
        );
        assert_eq!(session.advance((2.0, 0.0)).delta, None);
        assert_eq!(session.advance((2.0, 0.0)).delta, None);
        assert_eq!(session.accumulated(), 4.0);
        let step = session.advance((2.0, 0.0));
        assert!(step.committed_now);
        assert_eq!(step.delta, Some((2.0, 0.0)));
        assert!(session.is_dragging());
    }

    #[test]
    fn distance_metric_wiggle_back_to_press_point_stays_a_tap() {
        let mut session = GestureSession::begin(
            1,
            InputKind::Touch,
            DragPolicy::deferred_touch(),
            (0.0, 0.0),
            0.0,
        );
        assert_eq!(session.advance((3.0, 0.0)).delta, None);
        assert_eq!(session.advance((0.0, 0.0)).delta, None);
        assert_eq!(session.accumulated(), 3.0);
        assert!(session.finish(50.0).tapped);
    }
}
