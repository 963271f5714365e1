//! Floating action menu.
//!
//! A single circular button at a fixed screen corner that expands into a
//! vertical list of actions. The expand/collapse animation runs at a fixed
//! step per frame (not time-based); option hit-testing stays disabled until
//! expansion passes `MENU_HIT_GATE`, so the button can be re-clicked to
//! close early without spuriously selecting an option.

use chron_render::display::{
    MENU_BUTTON_RADIUS, MENU_HIT_GATE, MenuView, menu_button_center, menu_option_rect,
};

/// Expansion progress change per animation frame.
pub const MENU_STEP: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddTimeline,
    AddChapter,
    AddBranch,
    AddTextbox,
    AddLine,
}

pub const MENU_ACTIONS: [MenuAction; 5] = [
    MenuAction::AddTimeline,
    MenuAction::AddChapter,
    MenuAction::AddBranch,
    MenuAction::AddTextbox,
    MenuAction::AddLine,
];

pub const MENU_LABELS: [&str; 5] = ["Timeline", "Chapter", "Branch", "Text box", "Line"];

#[derive(Debug, Clone, Copy, Default)]
pub struct Menu {
    open: bool,
    progress: f32,
    pub hover: Option<usize>,
}

impl Menu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
        if !self.open {
            self.hover = None;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.hover = None;
    }

    /// Step the expand/collapse animation one frame. Returns `true` while
    /// still animating.
    pub fn advance(&mut self) -> bool {
        let target = if self.open { 1.0 } else { 0.0 };
        if (self.progress - target).abs() < f32::EPSILON {
            return false;
        }
        if self.progress < target {
            self.progress = (self.progress + MENU_STEP).min(1.0);
        } else {
            self.progress = (self.progress - MENU_STEP).max(0.0);
        }
        true
    }

    pub fn hit_button(&self, view_w: f32, view_h: f32, sx: f32, sy: f32) -> bool {
        let (cx, cy) = menu_button_center(view_w, view_h);
        let dx = sx - cx;
        let dy = sy - cy;
        dx * dx + dy * dy <= MENU_BUTTON_RADIUS * MENU_BUTTON_RADIUS
    }

    /// Which option is under the pointer, gated on expansion progress.
    pub fn option_at(&self, view_w: f32, view_h: f32, sx: f32, sy: f32) -> Option<usize> {
        if !self.open || self.progress <= MENU_HIT_GATE {
            return None;
        }
        for i in 0..MENU_ACTIONS.len() {
            let (x, y, w, h) = menu_option_rect(view_w, view_h, i, self.progress);
            if sx >= x && sx <= x + w && sy >= y && sy <= y + h {
                return Some(i);
            }
        }
        None
    }

    /// Frame state for the painter. The button itself is always drawn;
    /// options appear as `progress` grows.
    pub fn view(&self) -> MenuView {
        MenuView {
            progress: self.progress,
            hover: self.hover,
            labels: MENU_LABELS.to_vec(),
        }
    }
}
