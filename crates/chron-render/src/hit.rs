//! Hit testing: screen point → scene target lookup.
//!
//! A pointer-down is resolved by testing candidates in strict priority
//! order, stopping at the first match — this order encodes "what's on top"
//! since there is no z-buffer. Within a collection, later entities are
//! treated as topmost (last painted wins), so lists are walked in reverse.

use crate::metrics::*;
use chron_core::Camera;
use chron_core::Scene;
use chron_core::geometry::{GRID_CELL, dist, dist_to_segment, grid_to_world};
use chron_core::id::{ArcId, BranchId, ChapterId, LineId, TextboxId, TimelineId};
use chron_core::model::{InsertPoint, Textbox, Timeline};

/// Which part of a timeline's draggable surface was hit. All zones start a
/// timeline drag; double-click routing differs (Head/Tail edit the
/// timeline, the bare line body edits nothing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineZone {
    Title,
    Head,
    Tail,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    Start,
    End,
}

/// One of the eight textbox resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    North,
    South,
    East,
    West,
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    pub fn moves_left_edge(&self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn moves_right_edge(&self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn moves_top_edge(&self) -> bool {
        matches!(self, Self::North | Self::NorthWest | Self::NorthEast)
    }

    pub fn moves_bottom_edge(&self) -> bool {
        matches!(self, Self::South | Self::SouthWest | Self::SouthEast)
    }
}

/// The topmost thing under a screen point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Timeline {
        id: TimelineId,
        zone: TimelineZone,
    },
    Chapter {
        timeline: TimelineId,
        id: ChapterId,
    },
    /// Unassigned singleton groups draw no label, so only arc-keyed groups
    /// have a label to hit.
    ArcLabel {
        timeline: TimelineId,
        arc: ArcId,
    },
    /// Branches respond to double-click editing only; a single click on a
    /// branch falls through to camera panning.
    Branch {
        id: BranchId,
    },
    Textbox {
        id: TextboxId,
    },
    TextboxHandle {
        id: TextboxId,
        handle: Handle,
    },
    Line {
        id: LineId,
    },
    LineEndpoint {
        id: LineId,
        end: LineEnd,
    },
}

impl HitTarget {
    /// Whether a pointer-down on this target arms a drag.
    pub fn is_draggable(&self) -> bool {
        !matches!(self, Self::Branch { .. })
    }
}

/// Resolve the topmost target under `(sx, sy)`.
///
/// The floating menu and active placement modes are resolved by the
/// interaction engine before this is consulted.
pub fn hit_test(scene: &Scene, camera: &Camera, sx: f32, sy: f32) -> Option<HitTarget> {
    let (wx, wy) = camera.screen_to_world(sx, sy);

    // 1. Timeline surfaces: title, Head/Tail caps, the line body itself.
    for t in scene.timelines.iter().rev() {
        if let Some(zone) = timeline_zone_at(t, camera, sx, sy, wx, wy) {
            return Some(HitTarget::Timeline { id: t.id, zone });
        }
    }

    // 2. Chapter bodies (title band only — the tick/line region below the
    //    band still drags the timeline, handled above).
    for t in scene.timelines.iter().rev() {
        for (_, c) in t.content() {
            if chapter_rect(t, c).contains(wx, wy) {
                return Some(HitTarget::Chapter {
                    timeline: t.id,
                    id: c.id,
                });
            }
        }
    }

    // 3. Arc labels.
    for t in scene.timelines.iter().rev() {
        for group in t.chapter_groups() {
            let Some(arc) = group.arc_id() else {
                continue;
            };
            let (Some(&first), Some(&last)) = (group.chapters.first(), group.chapters.last())
            else {
                continue;
            };
            let start_cell = t.chapters[first].x;
            let end_cell = t.chapters[last].right_edge();
            if arc_label_rect(t, start_cell, end_cell).contains(wx, wy) {
                return Some(HitTarget::ArcLabel {
                    timeline: t.id,
                    arc,
                });
            }
        }
    }

    // 4. Branch curves (double-click edit targets).
    for b in scene.branches.iter().rev() {
        let Some((start, end)) = scene.branch_endpoints(b) else {
            continue;
        };
        if branch_curve_near(camera, start, end, sx, sy) {
            return Some(HitTarget::Branch { id: b.id });
        }
    }

    // 5. Textboxes: resize handles (corners before edges), then the body.
    for tb in scene.textboxes.iter().rev() {
        if let Some(handle) = handle_at(tb, camera, sx, sy) {
            return Some(HitTarget::TextboxHandle {
                id: tb.id,
                handle,
            });
        }
        let (x0, y0) = camera.world_to_screen(tb.x, tb.y);
        let (x1, y1) = camera.world_to_screen(tb.x + tb.width, tb.y + tb.height);
        if sx >= x0 && sx <= x1 && sy >= y0 && sy <= y1 {
            return Some(HitTarget::Textbox { id: tb.id });
        }
    }

    // 6. Free lines: endpoints grab before the body.
    for l in scene.lines.iter().rev() {
        let (sx1, sy1) = camera.world_to_screen(
            grid_to_world(l.x1 as f32),
            grid_to_world(l.y1 as f32),
        );
        let (sx2, sy2) = camera.world_to_screen(
            grid_to_world(l.x2 as f32),
            grid_to_world(l.y2 as f32),
        );
        if dist(sx, sy, sx1, sy1) <= ENDPOINT_RADIUS {
            return Some(HitTarget::LineEndpoint {
                id: l.id,
                end: LineEnd::Start,
            });
        }
        if dist(sx, sy, sx2, sy2) <= ENDPOINT_RADIUS {
            return Some(HitTarget::LineEndpoint {
                id: l.id,
                end: LineEnd::End,
            });
        }
        if dist_to_segment(sx, sy, sx1, sy1, sx2, sy2) <= FREELINE_TOL {
            return Some(HitTarget::Line { id: l.id });
        }
    }

    None
}

// ─── Timeline zones ──────────────────────────────────────────────────────

fn timeline_zone_at(
    t: &Timeline,
    camera: &Camera,
    sx: f32,
    sy: f32,
    wx: f32,
    wy: f32,
) -> Option<TimelineZone> {
    if title_rect(t).contains(wx, wy) {
        return Some(TimelineZone::Title);
    }

    let (_, line_sy) = camera.world_to_screen(t.x, t.y);
    let within_line = (sy - line_sy).abs() <= CAP_TOL;
    if within_line {
        let head = t.head();
        let tail = t.tail();
        let cell_span = |c: &chron_core::model::Chapter| {
            let (a, _) = camera.world_to_screen(t.x + c.x * GRID_CELL, t.y);
            let (b, _) = camera.world_to_screen(t.x + c.right_edge() * GRID_CELL, t.y);
            sx >= a && sx <= b
        };
        if cell_span(head) {
            return Some(TimelineZone::Head);
        }
        if cell_span(tail) {
            return Some(TimelineZone::Tail);
        }
    }

    // The horizontal line body, with a tighter tolerance than the caps.
    if (sy - line_sy).abs() <= LINE_BODY_TOL {
        let (a, _) = camera.world_to_screen(t.x, t.y);
        let (b, _) = camera.world_to_screen(t.x + t.span_world(), t.y);
        if sx >= a && sx <= b {
            return Some(TimelineZone::Body);
        }
    }

    None
}

/// Hover side query: is the pointer within the hover band of a timeline,
/// and above or below its line?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverSide {
    Above,
    Below,
}

pub fn timeline_hover_at(
    scene: &Scene,
    camera: &Camera,
    sx: f32,
    sy: f32,
) -> Option<(TimelineId, HoverSide)> {
    let (wx, wy) = camera.screen_to_world(sx, sy);
    for t in scene.timelines.iter().rev() {
        let within_x = wx >= t.x && wx <= t.x + t.span_world();
        if within_x && (wy - t.y).abs() <= HOVER_BAND {
            let side = if wy < t.y {
                HoverSide::Above
            } else {
                HoverSide::Below
            };
            return Some((t.id, side));
        }
    }
    None
}

// ─── Branch proximity ────────────────────────────────────────────────────

const BRANCH_SAMPLES: usize = 24;

fn branch_curve_near(
    camera: &Camera,
    start: (f32, f32),
    end: (f32, f32),
    sx: f32,
    sy: f32,
) -> bool {
    let mut prev = camera.world_to_screen(start.0, start.1);
    for i in 1..=BRANCH_SAMPLES {
        let t = i as f32 / BRANCH_SAMPLES as f32;
        let (px, py) = branch_point(start, end, t);
        let cur = camera.world_to_screen(px, py);
        if dist_to_segment(sx, sy, prev.0, prev.1, cur.0, cur.1) <= BRANCH_TOL {
            return true;
        }
        prev = cur;
    }
    false
}

// ─── Textbox handles ─────────────────────────────────────────────────────

fn handle_at(tb: &Textbox, camera: &Camera, sx: f32, sy: f32) -> Option<Handle> {
    let (x0, y0) = camera.world_to_screen(tb.x, tb.y);
    let (x1, y1) = camera.world_to_screen(tb.x + tb.width, tb.y + tb.height);

    let near_left = (sx - x0).abs() <= HANDLE_BAND;
    let near_right = (sx - x1).abs() <= HANDLE_BAND;
    let near_top = (sy - y0).abs() <= HANDLE_BAND;
    let near_bottom = (sy - y1).abs() <= HANDLE_BAND;
    let in_x = sx >= x0 - HANDLE_BAND && sx <= x1 + HANDLE_BAND;
    let in_y = sy >= y0 - HANDLE_BAND && sy <= y1 + HANDLE_BAND;

    if !(in_x && in_y) {
        return None;
    }

    // Corners take priority over edges.
    match (near_left, near_right, near_top, near_bottom) {
        (true, _, true, _) => Some(Handle::NorthWest),
        (_, true, true, _) => Some(Handle::NorthEast),
        (true, _, _, true) => Some(Handle::SouthWest),
        (_, true, _, true) => Some(Handle::SouthEast),
        (true, _, _, _) => Some(Handle::West),
        (_, true, _, _) => Some(Handle::East),
        (_, _, true, _) => Some(Handle::North),
        (_, _, _, true) => Some(Handle::South),
        _ => None,
    }
}

// ─── Placement-mode targets ──────────────────────────────────────────────

/// The nearest chapter/branch insertion point within grab radius of the
/// pointer, across all timelines.
pub fn insert_point_at(
    scene: &Scene,
    camera: &Camera,
    sx: f32,
    sy: f32,
) -> Option<(TimelineId, InsertPoint)> {
    let mut best: Option<(f32, TimelineId, InsertPoint)> = None;
    for t in &scene.timelines {
        for point in t.insert_points() {
            let (px, py) = camera.world_to_screen(t.x + grid_to_world(point.grid_x), t.y);
            let d = dist(sx, sy, px, py);
            if d <= INSERT_HIT_RADIUS && best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, t.id, point));
            }
        }
    }
    best.map(|(_, id, point)| (id, point))
}

/// The grid cell under the pointer, for free-line placement.
pub fn grid_point_at(camera: &Camera, sx: f32, sy: f32) -> (i32, i32) {
    let (wx, wy) = camera.screen_to_world(sx, sy);
    (
        (wx / GRID_CELL).round() as i32,
        (wy / GRID_CELL).round() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chron_core::model::{
        AlignX, AlignY, Branch, ChapterRecord, EndpointStyle, FreeLine, LineStyle,
        TimelineRecord,
    };

    fn scene_with_timeline() -> Scene {
        let mut scene = Scene::new();
        scene.set_timelines(&[TimelineRecord {
            id: TimelineId::new("t1"),
            name: "Main".to_string(),
            x: 0.0,
            y: 0.0,
        }]);
        scene
    }

    fn chapter(id: &str, title: &str, ts: i64) -> ChapterRecord {
        ChapterRecord {
            id: ChapterId::new(id),
            title: title.to_string(),
            timestamp: ts,
            arc_id: None,
            width: None,
        }
    }

    #[test]
    fn line_body_hits_timeline() {
        let scene = scene_with_timeline();
        let cam = Camera::default();
        // Middle of the span, on the line.
        let hit = hit_test(&scene, &cam, 75.0, 3.0);
        assert!(matches!(
            hit,
            Some(HitTarget::Timeline {
                zone: TimelineZone::Body,
                ..
            }) | Some(HitTarget::Timeline {
                zone: TimelineZone::Head,
                ..
            })
        ));
    }

    #[test]
    fn head_and_tail_zones() {
        let scene = scene_with_timeline();
        let cam = Camera::default();
        // Head occupies grid [0, 1) → world [0, 50).
        let hit = hit_test(&scene, &cam, 25.0, 0.0);
        assert_eq!(
            hit,
            Some(HitTarget::Timeline {
                id: TimelineId::new("t1"),
                zone: TimelineZone::Head
            })
        );
        // Tail occupies grid [2, 3) → world [100, 150).
        let hit = hit_test(&scene, &cam, 125.0, 0.0);
        assert_eq!(
            hit,
            Some(HitTarget::Timeline {
                id: TimelineId::new("t1"),
                zone: TimelineZone::Tail
            })
        );
    }

    #[test]
    fn chapter_band_hits_chapter_not_timeline() {
        let mut scene = scene_with_timeline();
        scene.set_chapters(TimelineId::new("t1"), &[chapter("c1", "One", 1)]);
        let cam = Camera::default();
        // Chapter c1 occupies grid [1, 2) → world [50, 100); band above line.
        let hit = hit_test(&scene, &cam, 75.0, -15.0);
        assert_eq!(
            hit,
            Some(HitTarget::Chapter {
                timeline: TimelineId::new("t1"),
                id: ChapterId::new("c1"),
            })
        );
        // Directly on the line under the chapter → timeline body drag.
        let hit = hit_test(&scene, &cam, 75.0, 0.0);
        assert!(matches!(hit, Some(HitTarget::Timeline { .. })));
    }

    #[test]
    fn textbox_corner_beats_edge() {
        let mut scene = Scene::new();
        scene.set_textboxes(vec![Textbox {
            id: TextboxId::new("tb"),
            x: 300.0,
            y: 300.0,
            width: 120.0,
            height: 60.0,
            content: String::new(),
            font_size: 14.0,
            align_x: AlignX::Left,
            align_y: AlignY::Top,
        }]);
        let cam = Camera::default();
        let hit = hit_test(&scene, &cam, 300.0, 300.0);
        assert_eq!(
            hit,
            Some(HitTarget::TextboxHandle {
                id: TextboxId::new("tb"),
                handle: Handle::NorthWest
            })
        );
        let hit = hit_test(&scene, &cam, 360.0, 300.0);
        assert_eq!(
            hit,
            Some(HitTarget::TextboxHandle {
                id: TextboxId::new("tb"),
                handle: Handle::North
            })
        );
        let hit = hit_test(&scene, &cam, 360.0, 330.0);
        assert_eq!(hit, Some(HitTarget::Textbox { id: TextboxId::new("tb") }));
    }

    #[test]
    fn line_endpoint_beats_body() {
        let mut scene = Scene::new();
        scene.set_lines(vec![FreeLine {
            id: LineId::new("l1"),
            x1: 2,
            y1: 3,
            x2: 5,
            y2: 3,
            line_style: LineStyle::Solid,
            start_cap: EndpointStyle::None,
            end_cap: EndpointStyle::Arrow,
        }]);
        let cam = Camera::default();
        // Endpoint 1 at world (100, 150).
        let hit = hit_test(&scene, &cam, 104.0, 152.0);
        assert_eq!(
            hit,
            Some(HitTarget::LineEndpoint {
                id: LineId::new("l1"),
                end: LineEnd::Start
            })
        );
        // Mid-span.
        let hit = hit_test(&scene, &cam, 175.0, 153.0);
        assert_eq!(hit, Some(HitTarget::Line { id: LineId::new("l1") }));
        // Too far away.
        assert_eq!(hit_test(&scene, &cam, 175.0, 180.0), None);
    }

    #[test]
    fn branch_curve_is_hit_and_not_draggable() {
        let mut scene = Scene::new();
        scene.set_timelines(&[
            TimelineRecord {
                id: TimelineId::new("a"),
                name: "A".to_string(),
                x: 0.0,
                y: 0.0,
            },
            TimelineRecord {
                id: TimelineId::new("b"),
                name: "B".to_string(),
                x: 0.0,
                y: 400.0,
            },
        ]);
        scene.set_branches(vec![Branch {
            id: BranchId::new("br"),
            start_timeline: TimelineId::new("a"),
            start_x: 1.5,
            end_timeline: TimelineId::new("b"),
            end_x: 1.5,
            line_style: LineStyle::Solid,
            start_cap: EndpointStyle::None,
            end_cap: EndpointStyle::None,
        }]);
        let cam = Camera::default();
        // Vertical S-curve between (75, 0) and (75, 400): its midpoint sits
        // at x = 75 by symmetry.
        let hit = hit_test(&scene, &cam, 75.0, 200.0);
        assert_eq!(hit, Some(HitTarget::Branch { id: BranchId::new("br") }));
        assert!(!hit.unwrap().is_draggable());
    }

    #[test]
    fn insert_point_lookup() {
        let scene = scene_with_timeline();
        let cam = Camera::default();
        // Empty timeline: single slot at grid 1.5 → world (75, 0).
        let (id, point) = insert_point_at(&scene, &cam, 78.0, 4.0).unwrap();
        assert_eq!(id, TimelineId::new("t1"));
        assert_eq!(point.index, 0);
        assert!(insert_point_at(&scene, &cam, 78.0, 40.0).is_none());
    }

    #[test]
    fn grid_point_rounds() {
        let cam = Camera::default();
        assert_eq!(grid_point_at(&cam, 130.0, 170.0), (3, 3));
        let mut cam = Camera::default();
        cam.pan(50.0, 0.0);
        assert_eq!(grid_point_at(&cam, 130.0, 170.0), (2, 3));
    }

    #[test]
    fn hover_side_detection() {
        let scene = scene_with_timeline();
        let cam = Camera::default();
        let (id, side) = timeline_hover_at(&scene, &cam, 75.0, -30.0).unwrap();
        assert_eq!(id, TimelineId::new("t1"));
        assert_eq!(side, HoverSide::Above);
        let (_, side) = timeline_hover_at(&scene, &cam, 75.0, 30.0).unwrap();
        assert_eq!(side, HoverSide::Below);
        assert!(timeline_hover_at(&scene, &cam, 75.0, 200.0).is_none());
    }
}
