//! The outward notification surface.
//!
//! Each committed gesture or placement produces exactly one notification.
//! The external document owner drains these after every `handle` call;
//! they are fire-and-forget data, never callbacks that can re-enter the
//! engine's own event handlers.

use chron_core::id::{ArcId, BranchId, ChapterId, LineId, TextboxId, TimelineId};
use chron_render::hit::HoverSide;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notification {
    /// Menu action: create a new timeline.
    AddTimelineRequested,
    /// Chapter placement committed at a content insertion index.
    AddChapterRequested {
        timeline: TimelineId,
        index: usize,
    },
    /// Branch placement committed between two different timelines.
    AddBranchRequested {
        start_timeline: TimelineId,
        start_x: f32,
        end_timeline: TimelineId,
        end_x: f32,
    },
    /// Menu action: create a textbox at a world position.
    AddTextboxRequested { x: f32, y: f32 },
    /// Line placement committed between two distinct grid points.
    AddLineRequested {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },

    EditTimelineRequested { id: TimelineId },
    EditChapterRequested { id: ChapterId },
    EditBranchRequested { id: BranchId },
    EditTextboxRequested { id: TextboxId },
    EditLineRequested { id: LineId },

    /// Chapter dropped on a valid insertion slot.
    ReorderChapterRequested {
        timeline: TimelineId,
        chapter: ChapterId,
        index: usize,
    },
    /// Arc group dropped on a valid group slot.
    ReorderArcRequested {
        timeline: TimelineId,
        arc: ArcId,
        group_index: usize,
    },
    /// Chapter/arc drag released over no valid slot: the owner must
    /// resupply authoritative chapter data so the visual layout reverts.
    ChapterSyncRequested { timeline: TimelineId },

    TimelineMoved { id: TimelineId, x: f32, y: f32 },
    TextboxMoved { id: TextboxId, x: f32, y: f32 },
    TextboxResized {
        id: TextboxId,
        width: f32,
        height: f32,
    },
    LineMoved {
        id: LineId,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },

    /// Pointer entered/left the hover band of a timeline.
    TimelineHoverChanged {
        target: Option<(TimelineId, HoverSide)>,
    },
    /// Pointer-down on empty canvas (used externally to dismiss panels).
    BackgroundClicked,
}
