//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and stylus events from whatever windowing layer
//! hosts the canvas into a unified `InputEvent` enum. Coordinates are screen
//! pixels relative to the canvas origin.

/// A normalized input event from any pointing device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pencil contact).
    PointerDown { x: f32, y: f32 },

    /// Pointer moved.
    PointerMove { x: f32, y: f32 },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },

    /// Pointer left the canvas area. Cancels pending drag arming and
    /// panning and clears hover; an active drag keeps tracking the pointer
    /// outside the canvas and ends on release.
    PointerLeave,

    /// Scroll / pinch. `zoom` is a multiplicative factor (1.0 = no change);
    /// when it is 1.0 the deltas pan the camera instead.
    Scroll { x: f32, y: f32, dx: f32, dy: f32, zoom: f32 },
}

impl InputEvent {
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Scroll { x, y, .. } => Some((*x, *y)),
            Self::PointerLeave => None,
        }
    }
}
