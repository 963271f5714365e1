//! The display list: a retained frame description handed to the backend.
//!
//! `build_frame` produces screen-space draw commands over `kurbo` paths and
//! `peniko` colors; the backend either walks them directly (immediate-mode
//! 2D context) or encodes them into a Vello scene. Text runs are carried as
//! data — glyph layout belongs to the host's text stack, and textbox
//! overlays are proxies synced to the world transform rather than pixels
//! baked into the frame.

use peniko::Color;

/// One draw command, already in screen space.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    Fill {
        path: kurbo::BezPath,
        color: Color,
    },
    Stroke {
        path: kurbo::BezPath,
        color: Color,
        width: f64,
        /// On/off dash lengths in screen pixels; `None` for solid.
        dash: Option<[f64; 2]>,
    },
    Text(TextRun),
}

/// A positioned single-line text run. `x`/`y` is the top-left corner of the
/// line box; `size` is already scaled by the camera zoom.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Color,
    pub text: String,
}

/// A built frame: world-space commands (panned/zoomed) plus a screen-space
/// overlay layer for the floating menu, which never participates in the
/// camera transform.
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub cmds: Vec<DrawCmd>,
    pub overlay: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }
}

// ─── Theme ───────────────────────────────────────────────────────────────

/// Frame colors. Light and dark variants mirror the host application themes.
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub grid_dot: Color,
    pub timeline: Color,
    pub timeline_cap: Color,
    pub text: Color,
    pub muted_text: Color,
    pub connector: Color,
    pub textbox_frame: Color,
    pub textbox_fill: Color,
    pub insert_point: Color,
    pub insert_point_armed: Color,
    pub slot_ok: Color,
    pub slot_blocked: Color,
    pub menu_button: Color,
    pub menu_option: Color,
    pub menu_option_hover: Color,
    /// Fallback segment color for chapters with no arc.
    pub unassigned_segment: Color,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Color::from_rgb8(0xF5, 0xF5, 0xF7),
            grid_dot: Color::from_rgba8(0, 0, 0, 0x14),
            timeline: Color::from_rgb8(0x2C, 0x2C, 0x2E),
            timeline_cap: Color::from_rgb8(0x00, 0x00, 0x00),
            text: Color::from_rgb8(0x1C, 0x1C, 0x1E),
            muted_text: Color::from_rgb8(0x86, 0x86, 0x8B),
            connector: Color::from_rgb8(0x3A, 0x3A, 0x3C),
            textbox_frame: Color::from_rgb8(0x86, 0x86, 0x8B),
            textbox_fill: Color::from_rgba8(0xFF, 0xFF, 0xFF, 0xCC),
            insert_point: Color::from_rgb8(0x4F, 0xC3, 0xF7),
            insert_point_armed: Color::from_rgb8(0xFF, 0x9F, 0x0A),
            slot_ok: Color::from_rgb8(0x30, 0xD1, 0x58),
            slot_blocked: Color::from_rgb8(0xFF, 0x45, 0x3A),
            menu_button: Color::from_rgb8(0x0A, 0x84, 0xFF),
            menu_option: Color::from_rgb8(0xFF, 0xFF, 0xFF),
            menu_option_hover: Color::from_rgb8(0xE5, 0xF1, 0xFF),
            unassigned_segment: Color::from_rgb8(0x98, 0x98, 0x9D),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::from_rgb8(0x1C, 0x1C, 0x1E),
            grid_dot: Color::from_rgba8(0xFF, 0xFF, 0xFF, 0x0F),
            timeline: Color::from_rgb8(0xE5, 0xE5, 0xEA),
            timeline_cap: Color::from_rgb8(0xF2, 0xF2, 0xF7),
            text: Color::from_rgb8(0xF2, 0xF2, 0xF7),
            muted_text: Color::from_rgb8(0x98, 0x98, 0x9D),
            connector: Color::from_rgb8(0xD1, 0xD1, 0xD6),
            textbox_frame: Color::from_rgb8(0x63, 0x63, 0x66),
            textbox_fill: Color::from_rgba8(0x2C, 0x2C, 0x2E, 0xCC),
            insert_point: Color::from_rgb8(0x64, 0xD2, 0xFF),
            insert_point_armed: Color::from_rgb8(0xFF, 0x9F, 0x0A),
            slot_ok: Color::from_rgb8(0x30, 0xD1, 0x58),
            slot_blocked: Color::from_rgb8(0xFF, 0x45, 0x3A),
            menu_button: Color::from_rgb8(0x0A, 0x84, 0xFF),
            menu_option: Color::from_rgb8(0x2C, 0x2C, 0x2E),
            menu_option_hover: Color::from_rgb8(0x3A, 0x3A, 0x3C),
            unassigned_segment: Color::from_rgb8(0x63, 0x63, 0x66),
        }
    }
}

// ─── Overlay state supplied by the interaction engine ────────────────────

/// Which placement workflow is armed, for preview rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    Chapter,
    Branch,
    Line,
}

/// A placement preview point in screen space.
#[derive(Debug, Clone, Copy)]
pub struct PreviewPoint {
    pub sx: f32,
    pub sy: f32,
    pub valid: bool,
}

/// Live placement-mode preview: hover highlight, armed first point, and the
/// rubber band between them.
#[derive(Debug, Clone, Copy)]
pub struct PlacementPreview {
    pub kind: PlacementKind,
    pub hover: Option<PreviewPoint>,
    pub first: Option<PreviewPoint>,
}

/// Insertion-slot feedback during a chapter or arc drag, in screen space.
#[derive(Debug, Clone, Copy)]
pub struct SlotHighlight {
    pub sx: f32,
    pub sy: f32,
    /// Green when the slot would accept the drop, red otherwise.
    pub reachable: bool,
}

/// Floating menu state for this frame.
#[derive(Debug, Clone)]
pub struct MenuView {
    /// Expansion progress in `[0, 1]`.
    pub progress: f32,
    pub hover: Option<usize>,
    pub labels: Vec<&'static str>,
}

// ─── Menu geometry (shared by paint and hit-testing) ─────────────────────

pub const MENU_MARGIN: f32 = 48.0;
pub const MENU_BUTTON_RADIUS: f32 = 24.0;
pub const MENU_OPTION_WIDTH: f32 = 132.0;
pub const MENU_OPTION_HEIGHT: f32 = 34.0;
pub const MENU_OPTION_GAP: f32 = 8.0;
/// Option hit-testing is disabled until expansion passes this progress.
pub const MENU_HIT_GATE: f32 = 0.3;

/// Screen position of the menu button center for a viewport.
pub fn menu_button_center(view_w: f32, view_h: f32) -> (f32, f32) {
    (view_w - MENU_MARGIN, view_h - MENU_MARGIN)
}

/// Screen rectangle of option `i`, expanded vertically above the button as
/// `progress` grows.
pub fn menu_option_rect(view_w: f32, view_h: f32, i: usize, progress: f32) -> (f32, f32, f32, f32) {
    let (cx, cy) = menu_button_center(view_w, view_h);
    let slide = (MENU_BUTTON_RADIUS
        + MENU_OPTION_GAP
        + (i as f32 + 1.0) * (MENU_OPTION_HEIGHT + MENU_OPTION_GAP))
        * progress;
    let top = cy - slide;
    (
        cx - MENU_OPTION_WIDTH + MENU_BUTTON_RADIUS,
        top,
        MENU_OPTION_WIDTH,
        MENU_OPTION_HEIGHT,
    )
}
