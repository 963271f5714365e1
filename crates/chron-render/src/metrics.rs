//! Entity layout metrics shared by painting and hit-testing.
//!
//! Both sides derive geometry from these constants and helpers, so the
//! pixels drawn for an entity and the region that selects it can never
//! drift apart. Rects are world-space; pointer tolerances are screen-space.

use chron_core::geometry::{GRID_CELL, WorldRect, dist};
use chron_core::model::{Chapter, Timeline};

/// Height of the chapter title band above the timeline line.
pub const CHAPTER_BAND_H: f32 = 18.0;
/// Gap between the chapter band and the line itself. Clicks inside the gap
/// (and on the line) drag the timeline, not the chapter.
pub const CHAPTER_BAND_GAP: f32 = 6.0;
/// Height of the arc label band below the line.
pub const ARC_BAND_H: f32 = 16.0;
/// Gap between the line and the arc band.
pub const ARC_BAND_GAP: f32 = 10.0;
/// Title box height, placed above the chapter band at the head.
pub const TITLE_BAND_H: f32 = 18.0;
/// Widest a timeline title renders before being ellipsized.
pub const TITLE_MAX_WIDTH: f32 = 160.0;
/// Timeline title font size in world units.
pub const TITLE_FONT: f32 = 14.0;
/// Chapter and arc label font size in world units.
pub const LABEL_FONT: f32 = 12.0;

/// Pointer tolerance around the timeline line body, screen px.
pub const LINE_BODY_TOL: f32 = 8.0;
/// Pointer tolerance around Head/Tail caps, screen px.
pub const CAP_TOL: f32 = 12.0;
/// Free line body tolerance, screen px.
pub const FREELINE_TOL: f32 = 8.0;
/// Free line endpoint grab radius, screen px.
pub const ENDPOINT_RADIUS: f32 = 10.0;
/// Branch curve tolerance, screen px.
pub const BRANCH_TOL: f32 = 8.0;
/// Textbox resize handle band, screen px.
pub const HANDLE_BAND: f32 = 8.0;
/// Insertion point grab radius, screen px.
pub const INSERT_HIT_RADIUS: f32 = 12.0;
/// Vertical hover band around a timeline line, world units each side.
pub const HOVER_BAND: f32 = 40.0;

/// Fixed screen radius of a `Dot` endpoint glyph.
pub const GLYPH_DOT_RADIUS: f64 = 4.0;
/// Screen length of an `Arrow` endpoint glyph.
pub const GLYPH_ARROW_LEN: f64 = 12.0;

// ─── Timeline-derived rects (world space) ────────────────────────────────

/// The clickable/drawn band of a content chapter: its title area above the
/// line, excluding the tick-mark region directly above the line.
pub fn chapter_rect(timeline: &Timeline, chapter: &Chapter) -> WorldRect {
    WorldRect::new(
        timeline.x + chapter.x * GRID_CELL,
        timeline.y - CHAPTER_BAND_GAP - CHAPTER_BAND_H,
        chapter.width * GRID_CELL,
        CHAPTER_BAND_H,
    )
}

/// The timeline title box, above the chapter band at the head.
pub fn title_rect(timeline: &Timeline) -> WorldRect {
    let width = crate::text::measure(&timeline.name, TITLE_FONT).min(TITLE_MAX_WIDTH);
    WorldRect::new(
        timeline.x,
        timeline.y - CHAPTER_BAND_GAP - CHAPTER_BAND_H - TITLE_BAND_H,
        width.max(GRID_CELL),
        TITLE_BAND_H,
    )
}

/// The label band of an arc group spanning grid cells `[start, end)`.
pub fn arc_label_rect(timeline: &Timeline, start_cell: f32, end_cell: f32) -> WorldRect {
    WorldRect::new(
        timeline.x + start_cell * GRID_CELL,
        timeline.y + ARC_BAND_GAP,
        (end_cell - start_cell) * GRID_CELL,
        ARC_BAND_H,
    )
}

// ─── Branch curve geometry ───────────────────────────────────────────────

/// Control points for the branch S-curve: offset horizontally outward from
/// each endpoint by `min(distance * 0.4, 100)` world units.
pub fn branch_controls(
    start: (f32, f32),
    end: (f32, f32),
) -> ((f32, f32), (f32, f32)) {
    let d = dist(start.0, start.1, end.0, end.1);
    let off = (d * 0.4).min(100.0);
    ((start.0 + off, start.1), (end.0 - off, end.1))
}

/// Evaluate the branch cubic at parameter `t`.
pub fn branch_point(start: (f32, f32), end: (f32, f32), t: f32) -> (f32, f32) {
    let (c1, c2) = branch_controls(start, end);
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    (
        b0 * start.0 + b1 * c1.0 + b2 * c2.0 + b3 * end.0,
        b0 * start.1 + b1 * c1.1 + b2 * c2.1 + b3 * end.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_control_offset_caps_at_100() {
        let (c1, c2) = branch_controls((0.0, 0.0), (1000.0, 200.0));
        assert!((c1.0 - 100.0).abs() < 1e-3);
        assert!((c2.0 - 900.0).abs() < 1e-3);
    }

    #[test]
    fn branch_control_offset_scales_when_close() {
        let (c1, _) = branch_controls((0.0, 0.0), (100.0, 0.0));
        assert!((c1.0 - 40.0).abs() < 1e-3);
    }

    #[test]
    fn branch_curve_hits_endpoints() {
        let start = (10.0, 20.0);
        let end = (200.0, -50.0);
        assert_eq!(branch_point(start, end, 0.0), start);
        let p1 = branch_point(start, end, 1.0);
        assert!((p1.0 - end.0).abs() < 1e-3);
        assert!((p1.1 - end.1).abs() < 1e-3);
    }
}
