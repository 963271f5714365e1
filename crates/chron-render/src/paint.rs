//! Frame building: scene + camera + interaction overlays → display list.
//!
//! Draw order per frame: background fill → dot grid → timelines → branches
//! → free lines → textboxes → placement previews → drag slot feedback →
//! floating menu (separate overlay layer, never panned/zoomed).
//!
//! Everything is emitted in screen space through the same camera transform
//! hit-testing uses, so visual position and click position always agree.

use crate::display::*;
use crate::metrics::*;
use crate::text;
use chron_core::Camera;
use chron_core::Scene;
use chron_core::geometry::{GRID_CELL, grid_to_world};
use chron_core::model::{Color as ModelColor, EndpointStyle, LineStyle, Textbox, Timeline};
use kurbo::{BezPath, Circle, Line as KurboLine, Rect, Shape};
use peniko::Color;

/// Screen radius of one grid dot.
const GRID_DOT_RADIUS: f64 = 1.5;
/// Timeline line stroke width at zoom 1 (scales with zoom).
const TIMELINE_STROKE: f32 = 3.0;
/// Cap stroke width at zoom 1.
const CAP_STROKE: f32 = 7.0;
/// Tick length below the line, world units.
const TICK_LEN: f32 = 6.0;
/// Dash pattern for dashed connectors, screen px.
const DASH: [f64; 2] = [8.0, 6.0];
/// Inner padding of a textbox, world units.
const TEXTBOX_PAD: f32 = 6.0;
/// Screen radius of an insertion point marker.
const INSERT_MARKER_RADIUS: f64 = 6.0;
/// Screen radius of the armed first-point marker.
const INSERT_ARMED_RADIUS: f64 = 9.0;
/// Screen radius of a slot highlight marker.
const SLOT_RADIUS: f64 = 8.0;

/// Everything `build_frame` needs for one frame.
pub struct FrameInput<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub view_w: f32,
    pub view_h: f32,
    pub theme: &'a Theme,
    pub placement: Option<&'a PlacementPreview>,
    pub slot: Option<SlotHighlight>,
    pub menu: Option<&'a MenuView>,
}

pub fn build_frame(input: &FrameInput) -> DisplayList {
    let mut list = DisplayList::new();

    paint_background(&mut list, input);
    paint_grid(&mut list, input);
    for t in &input.scene.timelines {
        paint_timeline(&mut list, input, t);
    }
    paint_branches(&mut list, input);
    paint_lines(&mut list, input);
    for tb in &input.scene.textboxes {
        paint_textbox(&mut list, input, tb);
    }
    if let Some(preview) = input.placement {
        paint_placement(&mut list, input, preview);
    }
    if let Some(slot) = input.slot {
        let color = if slot.reachable {
            input.theme.slot_ok
        } else {
            input.theme.slot_blocked
        };
        fill_circle(&mut list.cmds, slot.sx, slot.sy, SLOT_RADIUS, color);
    }
    if let Some(menu) = input.menu {
        paint_menu(&mut list, input, menu);
    }

    list
}

// ─── Background and grid ─────────────────────────────────────────────────

fn paint_background(list: &mut DisplayList, input: &FrameInput) {
    let rect = Rect::new(0.0, 0.0, input.view_w as f64, input.view_h as f64);
    list.cmds.push(DrawCmd::Fill {
        path: rect.to_path(0.1),
        color: input.theme.background,
    });
}

/// One dot per grid cell, world-aligned; only dots inside the visible
/// viewport rectangle are computed.
fn paint_grid(list: &mut DisplayList, input: &FrameInput) {
    let cam = input.camera;
    let (wx0, wy0) = cam.screen_to_world(0.0, 0.0);
    let (wx1, wy1) = cam.screen_to_world(input.view_w, input.view_h);

    let i0 = (wx0 / GRID_CELL).ceil() as i64;
    let i1 = (wx1 / GRID_CELL).floor() as i64;
    let j0 = (wy0 / GRID_CELL).ceil() as i64;
    let j1 = (wy1 / GRID_CELL).floor() as i64;

    let mut dots = BezPath::new();
    for j in j0..=j1 {
        for i in i0..=i1 {
            let (sx, sy) = cam.world_to_screen(i as f32 * GRID_CELL, j as f32 * GRID_CELL);
            let circle = Circle::new((sx as f64, sy as f64), GRID_DOT_RADIUS);
            dots.extend(circle.path_elements(0.1));
        }
    }
    if !dots.is_empty() {
        list.cmds.push(DrawCmd::Fill {
            path: dots,
            color: input.theme.grid_dot,
        });
    }
}

// ─── Timelines ───────────────────────────────────────────────────────────

fn paint_timeline(list: &mut DisplayList, input: &FrameInput, t: &Timeline) {
    let cam = input.camera;
    let theme = input.theme;
    let zoom = cam.zoom;

    let line_y = t.y;
    let span = t.span_world();
    let (x0, sy) = cam.world_to_screen(t.x, line_y);
    let (x1, _) = cam.world_to_screen(t.x + span, line_y);

    // Base line across the whole span.
    stroke_segment(
        &mut list.cmds,
        (x0, sy),
        (x1, sy),
        theme.timeline,
        (TIMELINE_STROKE * zoom) as f64,
        None,
    );

    // Arc-colored segments over each contiguous chapter group.
    for group in t.chapter_groups() {
        let (Some(&first), Some(&last)) = (group.chapters.first(), group.chapters.last())
        else {
            continue;
        };
        let start = t.x + t.chapters[first].x * GRID_CELL;
        let end = t.x + t.chapters[last].right_edge() * GRID_CELL;
        let color = group
            .arc_id()
            .and_then(|id| t.arc(id))
            .map_or(theme.unassigned_segment, |arc| to_peniko(arc.color));
        let (gx0, gy) = cam.world_to_screen(start, line_y);
        let (gx1, _) = cam.world_to_screen(end, line_y);
        stroke_segment(
            &mut list.cmds,
            (gx0, gy),
            (gx1, gy),
            color,
            (TIMELINE_STROKE * zoom) as f64 + 1.0,
            None,
        );

        // Arc label under the group.
        if let Some(arc) = group.arc_id().and_then(|id| t.arc(id)) {
            let rect = arc_label_rect(t, t.chapters[first].x, t.chapters[last].right_edge());
            let label = text::ellipsize(&arc.name, rect.width, LABEL_FONT);
            let (lx, ly) = cam.world_to_screen(rect.x, rect.y);
            list.cmds.push(DrawCmd::Text(TextRun {
                x: lx,
                y: ly,
                size: LABEL_FONT * zoom,
                color: to_peniko(arc.color),
                text: label,
            }));
        }
    }

    // Black Head/Tail caps.
    for cap in [t.head(), t.tail()] {
        let (cx0, cy) = cam.world_to_screen(t.x + cap.x * GRID_CELL, line_y);
        let (cx1, _) = cam.world_to_screen(t.x + cap.right_edge() * GRID_CELL, line_y);
        stroke_segment(
            &mut list.cmds,
            (cx0, cy),
            (cx1, cy),
            theme.timeline_cap,
            (CAP_STROKE * zoom) as f64,
            None,
        );
    }

    // Tick marks at content chapter boundaries.
    for (_, c) in t.content() {
        for cell in [c.x, c.right_edge()] {
            let (tx, ty0) = cam.world_to_screen(t.x + cell * GRID_CELL, line_y);
            let (_, ty1) = cam.world_to_screen(t.x + cell * GRID_CELL, line_y + TICK_LEN);
            stroke_segment(
                &mut list.cmds,
                (tx, ty0),
                (tx, ty1),
                theme.timeline,
                zoom as f64,
                None,
            );
        }
    }

    // Chapter titles in the band above the line.
    for (_, c) in t.content() {
        let rect = chapter_rect(t, c);
        let label = text::ellipsize(&c.title, rect.width, LABEL_FONT);
        let (lx, ly) = cam.world_to_screen(rect.x, rect.y);
        list.cmds.push(DrawCmd::Text(TextRun {
            x: lx,
            y: ly,
            size: LABEL_FONT * zoom,
            color: theme.text,
            text: label,
        }));
    }

    // Timeline title above the head.
    let rect = title_rect(t);
    let title = text::ellipsize(&t.name, TITLE_MAX_WIDTH, TITLE_FONT);
    let (lx, ly) = cam.world_to_screen(rect.x, rect.y);
    list.cmds.push(DrawCmd::Text(TextRun {
        x: lx,
        y: ly,
        size: TITLE_FONT * zoom,
        color: theme.text,
        text: title,
    }));

    // Direction arrowhead at the tail, unless a branch departs there.
    if !tail_arrow_suppressed(input.scene, t) {
        let (ax, ay) = cam.world_to_screen(t.x + span, line_y);
        arrow_glyph(&mut list.cmds, (ax, ay), (1.0, 0.0), theme.timeline);
    }
}

/// A branch anchored at the tail's grid position (rounded-integer
/// comparison) hides the tail arrowhead on that timeline.
fn tail_arrow_suppressed(scene: &Scene, t: &Timeline) -> bool {
    let tail_cell = t.tail().x.round();
    scene.branches.iter().any(|b| {
        (b.start_timeline == t.id && b.start_x.round() == tail_cell)
            || (b.end_timeline == t.id && b.end_x.round() == tail_cell)
    })
}

// ─── Branches and free lines ─────────────────────────────────────────────

fn paint_branches(list: &mut DisplayList, input: &FrameInput) {
    let cam = input.camera;
    for b in &input.scene.branches {
        let Some((start, end)) = input.scene.branch_endpoints(b) else {
            // Dangling timeline reference: skip, the owner re-syncs later.
            continue;
        };
        let (c1, c2) = branch_controls(start, end);
        let s = cam.world_to_screen(start.0, start.1);
        let e = cam.world_to_screen(end.0, end.1);
        let p1 = cam.world_to_screen(c1.0, c1.1);
        let p2 = cam.world_to_screen(c2.0, c2.1);

        let mut path = BezPath::new();
        path.move_to((s.0 as f64, s.1 as f64));
        path.curve_to(
            (p1.0 as f64, p1.1 as f64),
            (p2.0 as f64, p2.1 as f64),
            (e.0 as f64, e.1 as f64),
        );
        list.cmds.push(DrawCmd::Stroke {
            path,
            color: input.theme.connector,
            width: (2.0 * cam.zoom) as f64,
            dash: dash_for(b.line_style),
        });

        // Branch glyphs always point outward, left-to-right.
        endpoint_glyph(&mut list.cmds, s, (-1.0, 0.0), b.start_cap, input.theme.connector);
        endpoint_glyph(&mut list.cmds, e, (1.0, 0.0), b.end_cap, input.theme.connector);
    }
}

fn paint_lines(list: &mut DisplayList, input: &FrameInput) {
    let cam = input.camera;
    for l in &input.scene.lines {
        let s = cam.world_to_screen(grid_to_world(l.x1 as f32), grid_to_world(l.y1 as f32));
        let e = cam.world_to_screen(grid_to_world(l.x2 as f32), grid_to_world(l.y2 as f32));
        stroke_segment(
            &mut list.cmds,
            s,
            e,
            input.theme.connector,
            (2.0 * cam.zoom) as f64,
            dash_for(l.line_style),
        );

        // Glyph orientation comes from the vector away from the opposite
        // endpoint; degenerate (same-point) lines fall back to +x.
        let dir = norm_dir(e.0 - s.0, e.1 - s.1);
        endpoint_glyph(&mut list.cmds, s, (-dir.0, -dir.1), l.start_cap, input.theme.connector);
        endpoint_glyph(&mut list.cmds, e, dir, l.end_cap, input.theme.connector);
    }
}

// ─── Textboxes ───────────────────────────────────────────────────────────

fn paint_textbox(list: &mut DisplayList, input: &FrameInput, tb: &Textbox) {
    let cam = input.camera;
    let (x0, y0) = cam.world_to_screen(tb.x, tb.y);
    let (x1, y1) = cam.world_to_screen(tb.x + tb.width, tb.y + tb.height);
    let rect = Rect::new(x0 as f64, y0 as f64, x1 as f64, y1 as f64);

    list.cmds.push(DrawCmd::Fill {
        path: rect.to_path(0.1),
        color: input.theme.textbox_fill,
    });
    list.cmds.push(DrawCmd::Stroke {
        path: rect.to_path(0.1),
        color: input.theme.textbox_frame,
        width: cam.zoom as f64,
        dash: None,
    });

    // Wrapped text lines, positioned per the box alignments. Layout runs in
    // world units; only the final positions are transformed.
    let inner_w = tb.width - TEXTBOX_PAD * 2.0;
    let lines = text::wrap(&tb.content, inner_w, tb.font_size);
    let line_h = text::line_height(tb.font_size);
    let block_h = lines.len() as f32 * line_h;

    let start_y = match tb.align_y {
        chron_core::model::AlignY::Top => tb.y + TEXTBOX_PAD,
        chron_core::model::AlignY::Middle => tb.y + (tb.height - block_h) / 2.0,
        chron_core::model::AlignY::Bottom => tb.y + tb.height - TEXTBOX_PAD - block_h,
    };

    for (i, line) in lines.iter().enumerate() {
        let line_w = text::measure(line, tb.font_size);
        let lx = match tb.align_x {
            chron_core::model::AlignX::Left => tb.x + TEXTBOX_PAD,
            chron_core::model::AlignX::Center => tb.x + (tb.width - line_w) / 2.0,
            chron_core::model::AlignX::Right => tb.x + tb.width - TEXTBOX_PAD - line_w,
        };
        let ly = start_y + i as f32 * line_h;
        let (sx, sy) = cam.world_to_screen(lx, ly);
        list.cmds.push(DrawCmd::Text(TextRun {
            x: sx,
            y: sy,
            size: tb.font_size * cam.zoom,
            color: input.theme.text,
            text: line.clone(),
        }));
    }
}

// ─── Placement previews ──────────────────────────────────────────────────

fn paint_placement(list: &mut DisplayList, input: &FrameInput, preview: &PlacementPreview) {
    let theme = input.theme;

    if let Some(first) = preview.first {
        fill_circle(
            &mut list.cmds,
            first.sx,
            first.sy,
            INSERT_ARMED_RADIUS,
            theme.insert_point_armed,
        );
        // Rubber band from the armed first point to the hovered point.
        if let Some(hover) = preview.hover {
            stroke_segment(
                &mut list.cmds,
                (first.sx, first.sy),
                (hover.sx, hover.sy),
                theme.insert_point_armed,
                1.5,
                Some(DASH),
            );
        }
    }

    if let Some(hover) = preview.hover {
        let color = if hover.valid {
            theme.insert_point
        } else {
            theme.muted_text
        };
        fill_circle(&mut list.cmds, hover.sx, hover.sy, INSERT_MARKER_RADIUS, color);
    }
}

// ─── Floating menu (screen-space overlay) ────────────────────────────────

fn paint_menu(list: &mut DisplayList, input: &FrameInput, menu: &MenuView) {
    let theme = input.theme;
    let (cx, cy) = menu_button_center(input.view_w, input.view_h);

    if menu.progress > 0.0 {
        for (i, label) in menu.labels.iter().enumerate() {
            let (x, y, w, h) = menu_option_rect(input.view_w, input.view_h, i, menu.progress);
            let rect = Rect::new(x as f64, y as f64, (x + w) as f64, (y + h) as f64);
            let bg = if menu.hover == Some(i) {
                theme.menu_option_hover
            } else {
                theme.menu_option
            };
            list.overlay.push(DrawCmd::Fill {
                path: rect.to_rounded_rect(6.0).to_path(0.1),
                color: bg,
            });
            list.overlay.push(DrawCmd::Text(TextRun {
                x: x + 10.0,
                y: y + 9.0,
                size: 13.0,
                color: theme.text,
                text: (*label).to_string(),
            }));
        }
    }

    let button = Circle::new((cx as f64, cy as f64), MENU_BUTTON_RADIUS as f64);
    list.overlay.push(DrawCmd::Fill {
        path: button.to_path(0.1),
        color: theme.menu_button,
    });
    list.overlay.push(DrawCmd::Text(TextRun {
        x: cx - 5.0,
        y: cy - 9.0,
        size: 18.0,
        color: Color::from_rgb8(0xFF, 0xFF, 0xFF),
        text: "+".to_string(),
    }));
}

// ─── Shared primitives ───────────────────────────────────────────────────

fn dash_for(style: LineStyle) -> Option<[f64; 2]> {
    match style {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some(DASH),
    }
}

fn to_peniko(c: ModelColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn stroke_segment(
    cmds: &mut Vec<DrawCmd>,
    a: (f32, f32),
    b: (f32, f32),
    color: Color,
    width: f64,
    dash: Option<[f64; 2]>,
) {
    let line = KurboLine::new((a.0 as f64, a.1 as f64), (b.0 as f64, b.1 as f64));
    let mut path = BezPath::new();
    path.move_to(line.p0);
    path.line_to(line.p1);
    cmds.push(DrawCmd::Stroke {
        path,
        color,
        width,
        dash,
    });
}

fn fill_circle(cmds: &mut Vec<DrawCmd>, sx: f32, sy: f32, radius: f64, color: Color) {
    let circle = Circle::new((sx as f64, sy as f64), radius);
    cmds.push(DrawCmd::Fill {
        path: circle.to_path(0.1),
        color,
    });
}

fn norm_dir(dx: f32, dy: f32) -> (f32, f32) {
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        (1.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

/// Draw an endpoint glyph at `p`, pointing along `dir` (unit vector).
fn endpoint_glyph(
    cmds: &mut Vec<DrawCmd>,
    p: (f32, f32),
    dir: (f32, f32),
    style: EndpointStyle,
    color: Color,
) {
    match style {
        EndpointStyle::None => {}
        EndpointStyle::Dot => fill_circle(cmds, p.0, p.1, GLYPH_DOT_RADIUS, color),
        EndpointStyle::Arrow => arrow_glyph(cmds, p, dir, color),
    }
}

/// Filled triangle with its tip at `p`, pointing along `dir`.
fn arrow_glyph(cmds: &mut Vec<DrawCmd>, p: (f32, f32), dir: (f32, f32), color: Color) {
    let len = GLYPH_ARROW_LEN;
    let half = len * 0.45;
    let (dx, dy) = (dir.0 as f64, dir.1 as f64);
    let (px, py) = (p.0 as f64, p.1 as f64);
    // Perpendicular for the base corners.
    let (nx, ny) = (-dy, dx);
    let bx = px - dx * len;
    let by = py - dy * len;

    let mut path = BezPath::new();
    path.move_to((px, py));
    path.line_to((bx + nx * half, by + ny * half));
    path.line_to((bx - nx * half, by - ny * half));
    path.close_path();
    cmds.push(DrawCmd::Fill { path, color });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chron_core::TimelineId;
    use chron_core::model::TimelineRecord;

    fn base_input<'a>(scene: &'a Scene, camera: &'a Camera, theme: &'a Theme) -> FrameInput<'a> {
        FrameInput {
            scene,
            camera,
            view_w: 800.0,
            view_h: 600.0,
            theme,
            placement: None,
            slot: None,
            menu: None,
        }
    }

    fn count_text(list: &DisplayList, needle: &str) -> usize {
        list.cmds
            .iter()
            .filter(|c| matches!(c, DrawCmd::Text(run) if run.text.contains(needle)))
            .count()
    }

    #[test]
    fn empty_scene_still_paints_background_and_grid() {
        let scene = Scene::new();
        let camera = Camera::default();
        let theme = Theme::light();
        let list = build_frame(&base_input(&scene, &camera, &theme));
        assert!(list.cmds.len() >= 2);
        assert!(matches!(list.cmds[0], DrawCmd::Fill { .. }));
        assert!(list.overlay.is_empty());
    }

    #[test]
    fn timeline_title_is_emitted() {
        let mut scene = Scene::new();
        scene.set_timelines(&[TimelineRecord {
            id: TimelineId::new("t_paint"),
            name: "Voyage".to_string(),
            x: 100.0,
            y: 100.0,
        }]);
        let camera = Camera::default();
        let theme = Theme::light();
        let list = build_frame(&base_input(&scene, &camera, &theme));
        assert_eq!(count_text(&list, "Voyage"), 1);
    }

    #[test]
    fn menu_goes_to_overlay_layer() {
        let scene = Scene::new();
        let camera = Camera::default();
        let theme = Theme::light();
        let menu = MenuView {
            progress: 1.0,
            hover: None,
            labels: vec!["Timeline", "Chapter"],
        };
        let mut input = base_input(&scene, &camera, &theme);
        input.menu = Some(&menu);
        let list = build_frame(&input);
        assert!(!list.overlay.is_empty());
        let labels: usize = list
            .overlay
            .iter()
            .filter(|c| matches!(c, DrawCmd::Text(_)))
            .count();
        // Two option labels plus the button glyph.
        assert_eq!(labels, 3);
    }

    #[test]
    fn grid_culls_to_viewport() {
        let scene = Scene::new();
        let mut camera = Camera::default();
        camera.zoom_at(0.0, 0.0, 2.0);
        let theme = Theme::light();
        let list = build_frame(&base_input(&scene, &camera, &theme));
        // At zoom 2, an 800x600 view shows 400x300 world units →
        // at most 9x7 grid dots; the dots path exists and is bounded.
        let Some(DrawCmd::Fill { path, .. }) = list.cmds.get(1) else {
            panic!("expected grid fill");
        };
        // Each circle contributes a handful of elements; 9*7 cells is a
        // loose ceiling well under an unculled plane.
        assert!(path.elements().len() < 9 * 7 * 8);
    }
}
