//! Display list → Vello scene encoding.
//!
//! The raster/export backends present through Vello; interactive hosts may
//! instead walk the display list with their own 2D context. Text runs are
//! not encoded here — glyph layout and rasterization belong to the host's
//! text stack, which overlays text proxies synced to the same transform.

use crate::display::{DisplayList, DrawCmd};
use kurbo::{Affine, Stroke};
use peniko::Fill;
use vello::Scene;

/// Encode every fill/stroke command of the list (main layer, then overlay)
/// into a freshly-cleared Vello scene.
pub fn encode(list: &DisplayList) -> Scene {
    let mut scene = Scene::new();
    for cmd in list.cmds.iter().chain(list.overlay.iter()) {
        encode_cmd(&mut scene, cmd);
    }
    scene
}

fn encode_cmd(scene: &mut Scene, cmd: &DrawCmd) {
    match cmd {
        DrawCmd::Fill { path, color } => {
            scene.fill(Fill::NonZero, Affine::IDENTITY, *color, None, path);
        }
        DrawCmd::Stroke {
            path,
            color,
            width,
            dash,
        } => {
            let stroke = match dash {
                Some(pattern) => Stroke::new(*width).with_dashes(0.0, *pattern),
                None => Stroke::new(*width),
            };
            scene.stroke(&stroke, Affine::IDENTITY, *color, None, path);
        }
        DrawCmd::Text(run) => {
            log::trace!("TEXT {:?} at ({}, {})", run.text, run.x, run.y);
        }
    }
}
