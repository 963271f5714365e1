//! Camera transform between world and screen space.
//!
//! All entities are stored in world units (pixels at zoom 1, origin fixed to
//! the scene). The camera owns the pan offset and zoom scale and is the only
//! place the `screen = world * zoom + offset` transform lives, so drawing and
//! hit-testing can never disagree about where something is.

use serde::{Deserialize, Serialize};

/// Zoom scale lower bound.
pub const MIN_ZOOM: f32 = 0.5;
/// Zoom scale upper bound.
pub const MAX_ZOOM: f32 = 3.0;

/// Duration of a camera glide (center-on-timeline animation), in seconds.
pub const GLIDE_DURATION: f32 = 0.5;

/// Pan offset + zoom scale. Copy, serializable, so the external owner can
/// preserve camera state across a full UI teardown/rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// World-to-screen translation, in screen pixels.
    pub offset_x: f32,
    pub offset_y: f32,
    /// Scale factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, wx: f32, wy: f32) -> (f32, f32) {
        (
            wx * self.zoom + self.offset_x,
            wy * self.zoom + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, sx: f32, sy: f32) -> (f32, f32) {
        (
            (sx - self.offset_x) / self.zoom,
            (sy - self.offset_y) / self.zoom,
        )
    }

    /// Convert a screen-space length to a world-space length.
    pub fn screen_delta_to_world(&self, d: f32) -> f32 {
        d / self.zoom
    }

    /// Multiply zoom by `factor`, clamped, keeping the world point under
    /// `(sx, sy)` stationary on screen. Zoom is always anchored at the
    /// pointer, never at the viewport center.
    pub fn zoom_at(&mut self, sx: f32, sy: f32, factor: f32) {
        let (wx, wy) = self.screen_to_world(sx, sy);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        // Re-anchor: solve offset so (wx, wy) maps back to (sx, sy).
        self.offset_x = sx - wx * self.zoom;
        self.offset_y = sy - wy * self.zoom;
    }

    /// 1:1 screen-pixel panning. No inertia.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }
}

// ─── Glide animation ─────────────────────────────────────────────────────

/// Cubic ease-out interpolation of the camera offset toward a target.
///
/// Driven by explicit `advance(dt)` calls from the render loop rather than
/// wall-clock reads, so it is deterministic under test. Starting a new glide
/// while one is running simply replaces it.
#[derive(Debug, Clone, Copy)]
pub struct Glide {
    from_x: f32,
    from_y: f32,
    to_x: f32,
    to_y: f32,
    elapsed: f32,
}

impl Glide {
    pub fn new(camera: &Camera, target_offset: (f32, f32)) -> Self {
        Self {
            from_x: camera.offset_x,
            from_y: camera.offset_y,
            to_x: target_offset.0,
            to_y: target_offset.1,
            elapsed: 0.0,
        }
    }

    /// Step the glide by `dt` seconds, writing the interpolated offset into
    /// `camera`. Returns `false` once the target has been reached.
    pub fn advance(&mut self, dt: f32, camera: &mut Camera) -> bool {
        self.elapsed += dt;
        let t = (self.elapsed / GLIDE_DURATION).min(1.0);
        let k = 1.0 - (1.0 - t).powi(3);
        camera.offset_x = self.from_x + (self.to_x - self.from_x) * k;
        camera.offset_y = self.from_y + (self.to_y - self.from_y) * k;
        t < 1.0
    }
}
