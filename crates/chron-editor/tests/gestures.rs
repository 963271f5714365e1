//! End-to-end gesture scenarios driven through the public engine API.
//!
//! Every timing-sensitive behavior runs off the explicit `advance(dt)`
//! clock, so the arm-timer and double-click races are exercised without
//! real timers.

use chron_core::{ChapterId, LineId, TextboxId, TimelineId};
use chron_core::model::{
    AlignX, AlignY, ChapterRecord, EndpointStyle, FreeLine, LineStyle, Textbox, TimelineRecord,
};
use chron_editor::{CanvasEngine, InputEvent, Notification};
use pretty_assertions::assert_eq;

fn engine() -> CanvasEngine {
    CanvasEngine::new(800.0, 600.0)
}

fn down(e: &mut CanvasEngine, x: f32, y: f32) {
    e.handle(&InputEvent::PointerDown { x, y });
}

fn mv(e: &mut CanvasEngine, x: f32, y: f32) {
    e.handle(&InputEvent::PointerMove { x, y });
}

fn up(e: &mut CanvasEngine, x: f32, y: f32) {
    e.handle(&InputEvent::PointerUp { x, y });
}

/// Press, let the arm timer elapse, drag to a target, release.
fn drag(e: &mut CanvasEngine, from: (f32, f32), to: (f32, f32)) {
    down(e, from.0, from.1);
    e.advance(0.2);
    mv(e, to.0, to.1);
    up(e, to.0, to.1);
}

fn add_timeline(e: &mut CanvasEngine, id: &str, x: f32, y: f32) {
    e.add_timeline(&TimelineRecord {
        id: TimelineId::new(id),
        name: id.to_string(),
        x,
        y,
    });
}

fn moved_notifications(notifications: &[Notification]) -> Vec<&Notification> {
    notifications
        .iter()
        .filter(|n| {
            !matches!(
                n,
                Notification::TimelineHoverChanged { .. } | Notification::BackgroundClicked
            )
        })
        .collect()
}

// ─── Timeline drag ───────────────────────────────────────────────────────

#[test]
fn timeline_drag_snaps_to_grid_and_commits_once() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    // Grab the line body mid-span and drag by (62, 54): snaps to (50, 50).
    drag(&mut e, (75.0, 3.0), (137.0, 57.0));

    let notes = e.take_notifications();
    let commits: Vec<_> = notes
        .iter()
        .filter(|n| matches!(n, Notification::TimelineMoved { .. }))
        .collect();
    assert_eq!(commits.len(), 1);
    assert_eq!(
        commits[0],
        &Notification::TimelineMoved {
            id: TimelineId::new("t1"),
            x: 50.0,
            y: 50.0
        }
    );
    let t = e.scene().timeline(TimelineId::new("t1")).unwrap();
    assert_eq!((t.x, t.y), (50.0, 50.0));
}

#[test]
fn released_before_arm_delay_never_drags() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    down(&mut e, 75.0, 0.0);
    e.advance(0.05); // below the 150 ms arm delay
    up(&mut e, 75.0, 0.0);
    e.advance(0.3);

    assert!(moved_notifications(&e.take_notifications()).is_empty());
    let t = e.scene().timeline(TimelineId::new("t1")).unwrap();
    assert_eq!((t.x, t.y), (0.0, 0.0));
}

// ─── Double-click vs drag arming ─────────────────────────────────────────

#[test]
fn double_click_wins_over_drag_arming() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    // Two quick clicks on the Head cap, 5 px apart, 100 ms apart.
    down(&mut e, 25.0, 0.0);
    e.advance(0.05);
    up(&mut e, 25.0, 0.0);
    e.advance(0.05);
    down(&mut e, 28.0, 4.0);
    up(&mut e, 28.0, 4.0);
    e.advance(0.5);

    let notes = e.take_notifications();
    assert!(
        notes.contains(&Notification::EditTimelineRequested {
            id: TimelineId::new("t1")
        }),
        "Head double-click routes to the timeline editor"
    );
    assert!(
        !notes
            .iter()
            .any(|n| matches!(n, Notification::TimelineMoved { .. })),
        "no drag commit may fire for a double-click"
    );
}

#[test]
fn slow_second_click_does_not_edit() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    down(&mut e, 25.0, 0.0);
    e.advance(0.05);
    up(&mut e, 25.0, 0.0);
    e.advance(0.4); // outside the 300 ms window
    down(&mut e, 25.0, 0.0);
    e.advance(0.05);
    up(&mut e, 25.0, 0.0);

    assert!(
        !e.take_notifications()
            .iter()
            .any(|n| matches!(n, Notification::EditTimelineRequested { .. }))
    );
}

#[test]
fn chapter_double_click_edits_chapter() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);
    e.set_chapters(
        TimelineId::new("t1"),
        &[ChapterRecord {
            id: ChapterId::new("ch1"),
            title: "One".to_string(),
            timestamp: 1,
            arc_id: None,
            width: None,
        }],
    );

    // Chapter band above grid cell [1, 2).
    down(&mut e, 75.0, -15.0);
    up(&mut e, 75.0, -15.0);
    e.advance(0.05);
    down(&mut e, 75.0, -15.0);
    up(&mut e, 75.0, -15.0);

    assert!(e.take_notifications().contains(
        &Notification::EditChapterRequested {
            id: ChapterId::new("ch1")
        }
    ));
}

// ─── Background ──────────────────────────────────────────────────────────

#[test]
fn background_click_pans_and_notifies() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    down(&mut e, 400.0, 400.0);
    mv(&mut e, 420.0, 410.0);
    up(&mut e, 420.0, 410.0);

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::BackgroundClicked));
    let cam = e.viewport();
    assert_eq!((cam.offset_x, cam.offset_y), (20.0, 10.0));
}

// ─── Line dragging ───────────────────────────────────────────────────────

fn line(id: &str, x1: i32, y1: i32, x2: i32, y2: i32) -> FreeLine {
    FreeLine {
        id: LineId::new(id),
        x1,
        y1,
        x2,
        y2,
        line_style: LineStyle::Solid,
        start_cap: EndpointStyle::None,
        end_cap: EndpointStyle::None,
    }
}

#[test]
fn line_body_drag_round_trip() {
    let mut e = engine();
    e.set_lines(vec![line("l1", 2, 3, 5, 3)]);

    // Grab mid-span at world (175, 150), drag right by two grid cells.
    drag(&mut e, (175.0, 150.0), (275.0, 150.0));

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::LineMoved {
        id: LineId::new("l1"),
        x1: 4,
        y1: 3,
        x2: 7,
        y2: 3
    }));
}

#[test]
fn line_body_drag_does_not_accumulate_drift() {
    let mut e = engine();
    e.set_lines(vec![line("l1", 0, 0, 4, 0)]);

    down(&mut e, 100.0, 0.0);
    e.advance(0.2);
    // Many sub-cell wiggles that each round to zero must not add up.
    for i in 0..10 {
        mv(&mut e, 100.0 + (i % 2) as f32 * 20.0, 0.0);
    }
    mv(&mut e, 100.0, 0.0);
    up(&mut e, 100.0, 0.0);

    let l = e.scene().line(LineId::new("l1")).unwrap();
    assert_eq!((l.x1, l.y1, l.x2, l.y2), (0, 0, 4, 0));
}

#[test]
fn line_endpoint_drag_snaps_to_cell() {
    let mut e = engine();
    e.set_lines(vec![line("l1", 2, 3, 5, 3)]);

    // Grab the start endpoint at world (100, 150), drop near cell (0, 1).
    drag(&mut e, (100.0, 150.0), (12.0, 44.0));

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::LineMoved {
        id: LineId::new("l1"),
        x1: 0,
        y1: 1,
        x2: 5,
        y2: 3
    }));
}

// ─── Textbox move and resize ─────────────────────────────────────────────

fn textbox(id: &str, x: f32, y: f32, w: f32, h: f32) -> Textbox {
    Textbox {
        id: TextboxId::new(id),
        x,
        y,
        width: w,
        height: h,
        content: String::new(),
        font_size: 14.0,
        align_x: AlignX::Left,
        align_y: AlignY::Top,
    }
}

#[test]
fn textbox_drag_moves_freely_without_snapping() {
    let mut e = engine();
    e.set_textboxes(vec![textbox("tb", 300.0, 300.0, 120.0, 60.0)]);

    drag(&mut e, (360.0, 330.0), (373.0, 347.0));

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::TextboxMoved {
        id: TextboxId::new("tb"),
        x: 313.0,
        y: 317.0
    }));
}

#[test]
fn textbox_resize_floor_holds() {
    let mut e = engine();
    e.set_textboxes(vec![textbox("tb", 300.0, 300.0, 120.0, 60.0)]);

    // Drag the east edge far past the west edge.
    drag(&mut e, (420.0, 330.0), (0.0, 330.0));

    let tb = e.scene().textbox(TextboxId::new("tb")).unwrap();
    assert_eq!(tb.width, 50.0);
    assert_eq!(tb.height, 60.0);
    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::TextboxResized {
        id: TextboxId::new("tb"),
        width: 50.0,
        height: 60.0
    }));
}

#[test]
fn textbox_west_resize_keeps_east_edge_fixed() {
    let mut e = engine();
    e.set_textboxes(vec![textbox("tb", 300.0, 300.0, 120.0, 60.0)]);

    // West handle dragged 30 px right: width shrinks, right edge stays.
    drag(&mut e, (300.0, 330.0), (330.0, 330.0));

    let tb = e.scene().textbox(TextboxId::new("tb")).unwrap();
    assert_eq!(tb.width, 90.0);
    assert_eq!(tb.x + tb.width, 420.0);
}

#[test]
fn textbox_corner_resize_combines_axes() {
    let mut e = engine();
    e.set_textboxes(vec![textbox("tb", 300.0, 300.0, 120.0, 60.0)]);

    // South-east corner out by (40, 25).
    drag(&mut e, (420.0, 360.0), (460.0, 385.0));

    let tb = e.scene().textbox(TextboxId::new("tb")).unwrap();
    assert_eq!((tb.width, tb.height), (160.0, 85.0));
}

// ─── Chapter reorder drag ────────────────────────────────────────────────

fn three_chapters(e: &mut CanvasEngine) {
    e.set_chapters(
        TimelineId::new("t1"),
        &[
            ChapterRecord {
                id: ChapterId::new("ca"),
                title: "A".to_string(),
                timestamp: 1,
                arc_id: None,
                width: None,
            },
            ChapterRecord {
                id: ChapterId::new("cb"),
                title: "B".to_string(),
                timestamp: 2,
                arc_id: None,
                width: None,
            },
            ChapterRecord {
                id: ChapterId::new("cc"),
                title: "C".to_string(),
                timestamp: 3,
                arc_id: None,
                width: None,
            },
        ],
    );
}

#[test]
fn chapter_drop_on_valid_slot_reorders() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);
    three_chapters(&mut e);

    // Chapters at grid 1, 2, 3; tail at 4. Drag "A" (band above [50, 100))
    // toward the slot after "C" (grid 4 → world 200).
    drag(&mut e, (75.0, -15.0), (200.0, -15.0));

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::ReorderChapterRequested {
        timeline: TimelineId::new("t1"),
        chapter: ChapterId::new("ca"),
        index: 3
    }));
}

#[test]
fn chapter_drop_nowhere_asks_for_resync() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);
    three_chapters(&mut e);

    // Tiny wiggle: "A" stays near its own excluded slots.
    drag(&mut e, (75.0, -15.0), (80.0, -15.0));

    let notes = e.take_notifications();
    assert!(notes.contains(&Notification::ChapterSyncRequested {
        timeline: TimelineId::new("t1")
    }));
    assert!(
        !notes
            .iter()
            .any(|n| matches!(n, Notification::ReorderChapterRequested { .. }))
    );
}

#[test]
fn chapter_drag_stays_between_head_and_tail() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);
    three_chapters(&mut e);

    // Push "A" far left past Head; its position clamps at Head's edge.
    down(&mut e, 75.0, -15.0);
    e.advance(0.2);
    mv(&mut e, -500.0, -15.0);

    let t = e.scene().timeline(TimelineId::new("t1")).unwrap();
    let a = t
        .chapters
        .iter()
        .find(|c| c.id == ChapterId::new("ca"))
        .unwrap();
    assert_eq!(a.x, t.head().right_edge());
    up(&mut e, -500.0, -15.0);
}

// ─── Pointer leave ───────────────────────────────────────────────────────

#[test]
fn pointer_leave_cancels_pending_arm() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    down(&mut e, 75.0, 0.0);
    e.handle(&InputEvent::PointerLeave);
    // The arm timer must not ripen into a phantom drag after the pointer
    // is already gone.
    e.advance(0.3);
    mv(&mut e, 137.0, 57.0);
    up(&mut e, 137.0, 57.0);

    assert!(moved_notifications(&e.take_notifications()).is_empty());
    let t = e.scene().timeline(TimelineId::new("t1")).unwrap();
    assert_eq!((t.x, t.y), (0.0, 0.0));
}

#[test]
fn active_drag_tracks_through_pointer_leave() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 0.0);

    down(&mut e, 75.0, 3.0);
    e.advance(0.2);
    e.handle(&InputEvent::PointerLeave);
    // The drag keeps following the pointer outside the canvas and commits
    // exactly once on release.
    mv(&mut e, 137.0, 57.0);
    up(&mut e, 137.0, 57.0);

    let notes = e.take_notifications();
    let commits: Vec<_> = notes
        .iter()
        .filter(|n| matches!(n, Notification::TimelineMoved { .. }))
        .collect();
    assert_eq!(commits.len(), 1);
    assert_eq!(
        commits[0],
        &Notification::TimelineMoved {
            id: TimelineId::new("t1"),
            x: 50.0,
            y: 50.0
        }
    );
}

#[test]
fn pointer_leave_stops_panning() {
    let mut e = engine();

    down(&mut e, 400.0, 400.0);
    mv(&mut e, 420.0, 410.0);
    e.handle(&InputEvent::PointerLeave);
    mv(&mut e, 500.0, 500.0);

    // Only the pre-leave motion panned the camera.
    let cam = e.viewport();
    assert_eq!((cam.offset_x, cam.offset_y), (20.0, 10.0));
}

// ─── Hover notifications ─────────────────────────────────────────────────

#[test]
fn hover_fires_on_change_only() {
    let mut e = engine();
    add_timeline(&mut e, "t1", 0.0, 100.0);

    mv(&mut e, 75.0, 80.0); // above the line
    mv(&mut e, 76.0, 82.0); // still above: no second notification
    mv(&mut e, 75.0, 120.0); // below
    mv(&mut e, 75.0, 400.0); // off

    let hovers: Vec<_> = e
        .take_notifications()
        .into_iter()
        .filter(|n| matches!(n, Notification::TimelineHoverChanged { .. }))
        .collect();
    assert_eq!(hovers.len(), 3);
}

// ─── Zoom ────────────────────────────────────────────────────────────────

#[test]
fn scroll_zoom_keeps_pointer_anchored() {
    let mut e = engine();
    let before = e.viewport().screen_to_world(400.0, 300.0);
    e.handle(&InputEvent::Scroll {
        x: 400.0,
        y: 300.0,
        dx: 0.0,
        dy: 0.0,
        zoom: 1.5,
    });
    let after = e.viewport().screen_to_world(400.0, 300.0);
    assert!((before.0 - after.0).abs() < 1e-3);
    assert!((before.1 - after.1).abs() < 1e-3);
    assert!((e.viewport().zoom - 1.5).abs() < 1e-6);
}
