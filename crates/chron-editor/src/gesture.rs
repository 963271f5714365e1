//! The gesture state machine.
//!
//! A single tagged union replaces the pile of is-dragging-X / pending-Y
//! booleans such a canvas tends to grow: at any instant the engine is
//! idle, panning, holding an armed (not yet active) drag, or running
//! exactly one active drag. Placement modes are tracked separately since
//! they persist across individual gestures.

use chron_core::id::{ArcId, ChapterId, LineId, TextboxId, TimelineId};
use chron_core::model::InsertPoint;
use chron_render::hit::{Handle, HitTarget, LineEnd};
use smallvec::SmallVec;

/// Delay before an armed drag becomes active, in seconds. The window lets
/// a double-click win over a drag start on the same element.
pub const ARM_DELAY: f32 = 0.15;

/// Double-click window, in seconds.
pub const DOUBLE_CLICK_WINDOW: f32 = 0.3;
/// Maximum pointer travel between the two clicks, screen px.
pub const DOUBLE_CLICK_SLOP: f32 = 10.0;

/// A candidate insertion slot tracked during a chapter/arc drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Content insertion index (chapter drag) or group index (arc drag).
    pub index: usize,
    /// Slot position in grid units along the timeline.
    pub grid_x: f32,
    /// Whether the drag currently hovers close enough to commit here.
    pub hovered: bool,
}

/// An active drag with the per-kind snapshot it needs to stay stable under
/// live scene mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveDrag {
    Timeline {
        id: TimelineId,
        /// World offset from the pointer to the anchor at activation.
        grab: (f32, f32),
    },
    Chapter {
        timeline: TimelineId,
        id: ChapterId,
        /// Grid position at activation.
        start_x: f32,
        start_screen: (f32, f32),
        /// Candidate slots frozen at activation, own-adjacent slots
        /// already excluded.
        slots: SmallVec<[Slot; 8]>,
        /// Nearest slot, updated every move.
        slot: Option<Slot>,
    },
    ArcGroup {
        timeline: TimelineId,
        arc: ArcId,
        /// `(chapter index, grid position at activation)` per member.
        starts: SmallVec<[(usize, f32); 4]>,
        start_screen: (f32, f32),
        slots: SmallVec<[Slot; 8]>,
        slot: Option<Slot>,
    },
    Textbox {
        id: TextboxId,
        grab: (f32, f32),
    },
    TextboxResize {
        id: TextboxId,
        handle: Handle,
        /// `(x, y, width, height)` at activation.
        orig: (f32, f32, f32, f32),
        start_screen: (f32, f32),
    },
    LineBody {
        id: LineId,
        orig: (i32, i32, i32, i32),
        start_screen: (f32, f32),
    },
    LineEndpoint {
        id: LineId,
        end: LineEnd,
    },
}

impl ActiveDrag {
    /// The slot feedback to render this frame, if any.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::Chapter { slot, .. } | Self::ArcGroup { slot, .. } => *slot,
            _ => None,
        }
    }
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Camera pan; `last` is the previous pointer position.
    Panning { last: (f32, f32) },
    /// A draggable target was pressed; the drag activates once the arm
    /// timer elapses, unless the pointer is released first.
    Armed {
        target: HitTarget,
        at: f32,
        start: (f32, f32),
    },
    Dragging(ActiveDrag),
}

/// An armed placement workflow. Only one is armed at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Single-step: click a valid insertion point.
    Chapter,
    /// Two-step: start point on one timeline, end point on another.
    Branch {
        first: Option<(TimelineId, InsertPoint)>,
    },
    /// Two-step: two distinct grid points.
    Line { first: Option<(i32, i32)> },
}

impl Placement {
    pub fn kind(&self) -> chron_render::display::PlacementKind {
        match self {
            Self::Chapter => chron_render::display::PlacementKind::Chapter,
            Self::Branch { .. } => chron_render::display::PlacementKind::Branch,
            Self::Line { .. } => chron_render::display::PlacementKind::Line,
        }
    }
}
