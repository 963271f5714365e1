//! Whole-scene image export.
//!
//! Computes a bounding box over every entity (timelines with title
//! allowance, chapters, textboxes, lines, branch endpoints), pads it, then
//! renders once at zoom 1 into an offscreen-sized frame. The caller encodes
//! the resulting Vello scene into pixels; a degenerate bounding box skips
//! the export entirely rather than producing a corrupt image.

use chron_core::camera::Camera;
use chron_core::scene::Scene;
use chron_render::DisplayList;
use chron_render::display::Theme;
use chron_render::paint::{FrameInput, build_frame};

/// Fixed padding around the content bounding box, world units.
pub const EXPORT_PADDING: f32 = 50.0;

/// A rendered export frame: pixel dimensions plus the display list that
/// fills them at zoom 1. The raster backend turns the list into pixels
/// (`chron_render::scene_enc::encode` for Vello hosts).
#[derive(Debug, Clone)]
pub struct ExportFrame {
    pub width: u32,
    pub height: u32,
    pub list: DisplayList,
}

/// Render the whole scene to a flat frame, or `None` when there is nothing
/// to export.
pub fn export_scene(scene: &Scene, theme: &Theme) -> Option<ExportFrame> {
    let bounds = scene.content_bounds()?.expand(EXPORT_PADDING);
    if bounds.is_degenerate() {
        log::warn!("export skipped: degenerate bounds {bounds:?}");
        return None;
    }

    // Zoom 1, offset so the padded box's origin lands at screen (0, 0).
    let camera = Camera {
        offset_x: -bounds.x,
        offset_y: -bounds.y,
        zoom: 1.0,
    };
    let input = FrameInput {
        scene,
        camera: &camera,
        view_w: bounds.width,
        view_h: bounds.height,
        theme,
        placement: None,
        slot: None,
        menu: None,
    };
    let list = build_frame(&input);

    Some(ExportFrame {
        width: bounds.width.ceil() as u32,
        height: bounds.height.ceil() as u32,
        list,
    })
}
