//! Headless drive of the canvas engine.
//!
//! Builds a small scene, walks through a branch placement and a timeline
//! drag entirely through the event API, and renders an export frame —
//! no window required. Run with `RUST_LOG=debug` to watch the engine's
//! gesture log.

use chron_core::{ChapterId, TimelineId};
use chron_core::model::{ChapterRecord, TimelineRecord};
use chron_editor::{CanvasEngine, InputEvent, export_scene};
use chron_render::display::Theme;

fn main() {
    env_logger::init();

    let mut engine = CanvasEngine::new(1280.0, 720.0);
    engine.add_timeline(&TimelineRecord {
        id: TimelineId::new("voyage"),
        name: "The Voyage".to_string(),
        x: 100.0,
        y: 200.0,
    });
    engine.add_timeline(&TimelineRecord {
        id: TimelineId::new("mutiny"),
        name: "The Mutiny".to_string(),
        x: 100.0,
        y: 450.0,
    });
    engine.set_chapters(
        TimelineId::new("voyage"),
        &[
            ChapterRecord {
                id: ChapterId::new("departure"),
                title: "Departure".to_string(),
                timestamp: 1,
                arc_id: None,
                width: None,
            },
            ChapterRecord {
                id: ChapterId::new("storm"),
                title: "The Storm".to_string(),
                timestamp: 2,
                arc_id: None,
                width: None,
            },
        ],
    );

    // Two-step branch placement between the timelines.
    engine.arm_branch_placement();
    engine.handle(&InputEvent::PointerDown { x: 150.0, y: 200.0 });
    engine.handle(&InputEvent::PointerUp { x: 150.0, y: 200.0 });
    engine.handle(&InputEvent::PointerDown { x: 175.0, y: 450.0 });
    engine.handle(&InputEvent::PointerUp { x: 175.0, y: 450.0 });

    // Drag the first timeline one cell down.
    engine.handle(&InputEvent::PointerDown { x: 200.0, y: 200.0 });
    engine.advance(0.2);
    engine.handle(&InputEvent::PointerMove { x: 200.0, y: 250.0 });
    engine.handle(&InputEvent::PointerUp { x: 200.0, y: 250.0 });

    for n in engine.take_notifications() {
        println!("notification: {n:?}");
    }

    let list = engine.frame();
    println!(
        "frame: {} world commands, {} overlay commands",
        list.cmds.len(),
        list.overlay.len()
    );

    // Viewport state round-trips through JSON, so a host can persist the
    // camera across a full UI teardown/rebuild.
    let saved = serde_json::to_string(&engine.viewport()).expect("camera serializes");
    println!("viewport: {saved}");
    engine.set_viewport(serde_json::from_str(&saved).expect("camera deserializes"));

    match export_scene(engine.scene(), &Theme::light()) {
        Some(frame) => println!("export: {}x{} px", frame.width, frame.height),
        None => println!("export: nothing to export"),
    }
}
