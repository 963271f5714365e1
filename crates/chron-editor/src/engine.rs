//! The canvas interaction engine.
//!
//! Owns the scene, the camera, and all transient interaction state, and
//! turns normalized pointer events into model mutations plus outward
//! notifications. Control flow per gesture: pointer event → hit-test in
//! strict priority order (menu → placement → double-click → draggables →
//! pan) → live scene mutation for visual feedback → committed notification
//! on release → redraw request.
//!
//! Nothing here reads the wall clock. The host drives `advance(dt)` once
//! per frame; arm timers, the camera glide, and the menu animation all run
//! off that, which makes every race in this file reproducible in a test.

use crate::events::Notification;
use crate::gesture::{
    ARM_DELAY, ActiveDrag, DOUBLE_CLICK_SLOP, DOUBLE_CLICK_WINDOW, Gesture, Placement, Slot,
};
use crate::input::InputEvent;
use crate::menu::{MENU_ACTIONS, Menu, MenuAction};
use chron_core::camera::{Camera, Glide};
use chron_core::geometry::{GRID_CELL, grid_to_world, snap_world};
use chron_core::id::TimelineId;
use chron_core::model::{
    ChapterRecord, TEXTBOX_MIN_HEIGHT, TEXTBOX_MIN_WIDTH, Textbox, Timeline, TimelineRecord,
};
use chron_core::scene::Scene;
use chron_render::display::{PlacementPreview, PreviewPoint, SlotHighlight, Theme};
use chron_render::hit::{self, HitTarget, HoverSide, LineEnd, TimelineZone};
use chron_render::paint::{FrameInput, build_frame};
use chron_render::{DisplayList, text};
use smallvec::SmallVec;

/// A drag hovers a slot once the pointer's grid position is within this
/// many cells of it.
const SLOT_HOVER_RANGE: f32 = 0.5;
/// Inner padding used when growing a textbox to fit its content.
const TEXTBOX_PAD: f32 = 6.0;

struct ClickStamp {
    sx: f32,
    sy: f32,
    at: f32,
}

/// Pointer cursor the host should show for the current gesture. Returning
/// to `Default` on release/leave falls out of the gesture reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Grabbing,
    Move,
    ResizeEw,
    ResizeNs,
    ResizeNesw,
    ResizeNwse,
}

pub struct CanvasEngine {
    scene: Scene,
    camera: Camera,
    theme: Theme,
    view_w: f32,
    view_h: f32,

    gesture: Gesture,
    placement: Option<Placement>,
    menu: Menu,
    glide: Option<Glide>,

    /// Last pointer position while inside the canvas.
    pointer: Option<(f32, f32)>,
    hover: Option<(TimelineId, HoverSide)>,
    last_click: Option<ClickStamp>,

    /// Monotonic clock, advanced only by `advance(dt)`.
    clock: f32,
    needs_redraw: bool,
    notifications: Vec<Notification>,
}

impl CanvasEngine {
    pub fn new(view_w: f32, view_h: f32) -> Self {
        Self {
            scene: Scene::new(),
            camera: Camera::default(),
            theme: Theme::light(),
            view_w,
            view_h,
            gesture: Gesture::Idle,
            placement: None,
            menu: Menu::default(),
            glide: None,
            pointer: None,
            hover: None,
            last_click: None,
            clock: 0.0,
            needs_redraw: true,
            notifications: Vec::new(),
        }
    }

    // ─── Data-update surface (external owner → engine) ───────────────────

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn set_view_size(&mut self, w: f32, h: f32) {
        self.view_w = w;
        self.view_h = h;
        self.needs_redraw = true;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.needs_redraw = true;
    }

    pub fn set_timelines(&mut self, records: &[TimelineRecord]) {
        self.scene.set_timelines(records);
        self.needs_redraw = true;
    }

    pub fn add_timeline(&mut self, record: &TimelineRecord) {
        self.scene.add_timeline(record);
        self.needs_redraw = true;
    }

    pub fn remove_timeline(&mut self, id: TimelineId) {
        self.scene.remove_timeline(id);
        self.needs_redraw = true;
    }

    pub fn set_chapters(&mut self, timeline: TimelineId, records: &[ChapterRecord]) {
        self.scene.set_chapters(timeline, records);
        self.needs_redraw = true;
    }

    pub fn set_arcs(&mut self, timeline: TimelineId, arcs: Vec<chron_core::model::ArcRecord>) {
        self.scene.set_arcs(timeline, arcs);
        self.needs_redraw = true;
    }

    pub fn set_branches(&mut self, branches: Vec<chron_core::model::Branch>) {
        self.scene.set_branches(branches);
        self.needs_redraw = true;
    }

    pub fn set_lines(&mut self, lines: Vec<chron_core::model::FreeLine>) {
        self.scene.set_lines(lines);
        self.needs_redraw = true;
    }

    /// Replace the textbox list, growing each box to fit its content.
    /// Height auto-grows but never shrinks below the natural text height.
    pub fn set_textboxes(&mut self, mut textboxes: Vec<Textbox>) {
        for tb in &mut textboxes {
            let natural = text::natural_height(&tb.content, tb.width - TEXTBOX_PAD * 2.0, tb.font_size)
                + TEXTBOX_PAD * 2.0;
            tb.height = tb.height.max(natural).max(TEXTBOX_MIN_HEIGHT);
            tb.width = tb.width.max(TEXTBOX_MIN_WIDTH);
        }
        self.scene.set_textboxes(textboxes);
        self.needs_redraw = true;
    }

    pub fn viewport(&self) -> Camera {
        self.camera
    }

    pub fn set_viewport(&mut self, camera: Camera) {
        self.camera = camera;
        self.needs_redraw = true;
    }

    /// Start an eased glide that centers the given timeline in the view.
    pub fn center_on_timeline(&mut self, id: TimelineId) {
        let Some(t) = self.scene.timeline(id) else {
            log::warn!("center_on_timeline: unknown timeline {id}");
            return;
        };
        let cx = t.x + t.span_world() / 2.0;
        let cy = t.y;
        let target = (
            self.view_w / 2.0 - cx * self.camera.zoom,
            self.view_h / 2.0 - cy * self.camera.zoom,
        );
        self.glide = Some(Glide::new(&self.camera, target));
        self.needs_redraw = true;
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ─── Placement mode surface ──────────────────────────────────────────
    //
    // The floating menu routes here; external toolbars may arm the same
    // modes directly. Arming replaces whatever mode was active.

    pub fn arm_chapter_placement(&mut self) {
        self.placement = Some(Placement::Chapter);
        self.needs_redraw = true;
    }

    pub fn arm_branch_placement(&mut self) {
        self.placement = Some(Placement::Branch { first: None });
        self.needs_redraw = true;
    }

    pub fn arm_line_placement(&mut self) {
        self.placement = Some(Placement::Line { first: None });
        self.needs_redraw = true;
    }

    pub fn cancel_placement(&mut self) {
        self.placement = None;
        self.needs_redraw = true;
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }

    fn notify(&mut self, n: Notification) {
        log::debug!("notify: {n:?}");
        self.notifications.push(n);
    }

    /// Render the whole scene to a flat export frame (`None` when empty).
    pub fn export(&self) -> Option<crate::export::ExportFrame> {
        crate::export::export_scene(&self.scene, &self.theme)
    }

    /// The cursor matching the current gesture.
    pub fn cursor(&self) -> Cursor {
        use chron_render::hit::Handle;
        match &self.gesture {
            Gesture::Idle | Gesture::Armed { .. } => Cursor::Default,
            Gesture::Panning { .. } => Cursor::Grabbing,
            Gesture::Dragging(drag) => match drag {
                ActiveDrag::TextboxResize { handle, .. } => match handle {
                    Handle::East | Handle::West => Cursor::ResizeEw,
                    Handle::North | Handle::South => Cursor::ResizeNs,
                    Handle::NorthEast | Handle::SouthWest => Cursor::ResizeNesw,
                    Handle::NorthWest | Handle::SouthEast => Cursor::ResizeNwse,
                },
                _ => Cursor::Move,
            },
        }
    }

    // ─── Frame driving ───────────────────────────────────────────────────

    /// Step animations and the drag-arm timer by `dt` seconds. Returns
    /// whether a redraw is needed (the host may skip drawing otherwise).
    pub fn advance(&mut self, dt: f32) -> bool {
        self.clock += dt;

        // Promote an armed drag whose delay has elapsed.
        let ripe = match &self.gesture {
            Gesture::Armed { target, at, .. } if self.clock - *at >= ARM_DELAY => Some(*target),
            _ => None,
        };
        if let Some(target) = ripe {
            self.gesture = match self.activate_drag(target) {
                Some(drag) => Gesture::Dragging(drag),
                None => Gesture::Idle,
            };
            self.needs_redraw = true;
        }

        if let Some(glide) = &mut self.glide {
            let live = glide.advance(dt, &mut self.camera);
            if !live {
                self.glide = None;
            }
            self.needs_redraw = true;
        }

        if self.menu.advance() {
            self.needs_redraw = true;
        }

        std::mem::take(&mut self.needs_redraw)
    }

    /// Build the display list for the current state.
    pub fn frame(&self) -> DisplayList {
        let placement = self.placement.as_ref().map(|p| self.placement_preview(p));
        let slot = self.slot_highlight();
        let menu = self.menu.view();
        let input = FrameInput {
            scene: &self.scene,
            camera: &self.camera,
            view_w: self.view_w,
            view_h: self.view_h,
            theme: &self.theme,
            placement: placement.as_ref(),
            slot,
            menu: Some(&menu),
        };
        build_frame(&input)
    }

    // ─── Event dispatch ──────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y } => self.on_pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::PointerUp { x, y } => self.on_pointer_up(x, y),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::Scroll { x, y, dx, dy, zoom } => {
                if (zoom - 1.0).abs() > f32::EPSILON {
                    self.camera.zoom_at(x, y, zoom);
                } else {
                    self.camera.pan(-dx, -dy);
                }
                self.needs_redraw = true;
            }
        }
    }

    fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));

        // 1. Floating menu button / open option.
        if self.menu.hit_button(self.view_w, self.view_h, x, y) {
            self.menu.toggle();
            self.needs_redraw = true;
            return;
        }
        if let Some(i) = self.menu.option_at(self.view_w, self.view_h, x, y) {
            self.run_menu_action(MENU_ACTIONS[i], x, y);
            self.menu.close();
            self.needs_redraw = true;
            return;
        }

        // 2. An armed placement mode swallows all other hit-testing.
        if self.placement.is_some() {
            self.placement_click(x, y);
            self.needs_redraw = true;
            return;
        }

        // 3. Double-click recognition.
        let double = self
            .last_click
            .as_ref()
            .is_some_and(|prev| {
                self.clock - prev.at <= DOUBLE_CLICK_WINDOW
                    && chron_core::geometry::dist(x, y, prev.sx, prev.sy) <= DOUBLE_CLICK_SLOP
            });
        if double && self.fire_edit_at(x, y) {
            // The first click may have armed a drag; the double-click wins.
            self.gesture = Gesture::Idle;
            self.last_click = None;
            self.needs_redraw = true;
            return;
        }
        self.last_click = Some(ClickStamp {
            sx: x,
            sy: y,
            at: self.clock,
        });

        // 4–8. Draggable targets arm a delayed drag.
        match hit::hit_test(&self.scene, &self.camera, x, y) {
            Some(target) if target.is_draggable() => {
                self.gesture = Gesture::Armed {
                    target,
                    at: self.clock,
                    start: (x, y),
                };
            }
            Some(_) => {
                // Branch curves only respond to double-click editing;
                // a single click pans like the background (no dismiss).
                self.gesture = Gesture::Panning { last: (x, y) };
            }
            None => {
                // 9. Fallback: camera pan + panel-dismiss notification.
                self.gesture = Gesture::Panning { last: (x, y) };
                self.notify(Notification::BackgroundClicked);
            }
        }
        self.needs_redraw = true;
    }

    fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));

        // Hover recomputation always precedes any redraw decision, so a
        // frame never shows a stale highlight against a moved pointer.
        if self.placement.is_some() {
            self.needs_redraw = true;
        } else {
            let hover = hit::timeline_hover_at(&self.scene, &self.camera, x, y);
            if hover != self.hover {
                self.hover = hover;
                self.notify(Notification::TimelineHoverChanged { target: hover });
                self.needs_redraw = true;
            }
        }
        if self.menu.is_open() {
            let hover = self.menu.option_at(self.view_w, self.view_h, x, y);
            if hover != self.menu.hover {
                self.menu.hover = hover;
                self.needs_redraw = true;
            }
        }

        if matches!(self.gesture, Gesture::Dragging(_)) {
            self.drag_move(x, y);
            self.needs_redraw = true;
        } else if let Gesture::Panning { last } = &mut self.gesture {
            let (lx, ly) = *last;
            *last = (x, y);
            self.camera.pan(x - lx, y - ly);
            self.needs_redraw = true;
        }
    }

    fn on_pointer_up(&mut self, x: f32, y: f32) {
        self.pointer = Some((x, y));
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => {}
            // Released before the arm timer fired: no drag occurred.
            Gesture::Armed { .. } => {}
            Gesture::Dragging(drag) => self.commit_drag(drag),
        }
        self.needs_redraw = true;
    }

    /// Leaving the canvas drops a pending arm timer (no phantom drag may
    /// start after the pointer is gone) and stops panning, and clears the
    /// hover highlight. An active drag keeps tracking the pointer outside
    /// the canvas and commits on the eventual release.
    fn on_pointer_leave(&mut self) {
        self.pointer = None;
        match self.gesture {
            Gesture::Armed { .. } | Gesture::Panning { .. } => self.gesture = Gesture::Idle,
            Gesture::Idle | Gesture::Dragging(_) => {}
        }
        if self.hover.is_some() {
            self.hover = None;
            self.notify(Notification::TimelineHoverChanged { target: None });
        }
        self.menu.hover = None;
        self.needs_redraw = true;
    }

    // ─── Menu actions ────────────────────────────────────────────────────

    fn run_menu_action(&mut self, action: MenuAction, _sx: f32, _sy: f32) {
        match action {
            MenuAction::AddTimeline => self.notify(Notification::AddTimelineRequested),
            MenuAction::AddChapter => self.arm_chapter_placement(),
            MenuAction::AddBranch => self.arm_branch_placement(),
            MenuAction::AddTextbox => {
                // New textboxes land at the center of the current view.
                let (wx, wy) = self
                    .camera
                    .screen_to_world(self.view_w / 2.0, self.view_h / 2.0);
                self.notify(Notification::AddTextboxRequested { x: wx, y: wy });
            }
            MenuAction::AddLine => self.arm_line_placement(),
        }
    }

    // ─── Placement workflows ─────────────────────────────────────────────

    fn placement_click(&mut self, x: f32, y: f32) {
        let Some(placement) = self.placement.take() else {
            return;
        };
        match placement {
            Placement::Chapter => {
                if let Some((timeline, point)) =
                    hit::insert_point_at(&self.scene, &self.camera, x, y)
                {
                    self.notify(Notification::AddChapterRequested {
                        timeline,
                        index: point.index,
                    });
                }
                // Valid or not, chapter mode deactivates after one click.
            }
            Placement::Branch { first: None } => {
                if let Some(start) = hit::insert_point_at(&self.scene, &self.camera, x, y) {
                    self.placement = Some(Placement::Branch { first: Some(start) });
                }
                // Off-timeline click: mode exits.
            }
            Placement::Branch {
                first: Some((start_timeline, start_point)),
            } => {
                match hit::insert_point_at(&self.scene, &self.camera, x, y) {
                    Some((end_timeline, end_point)) if end_timeline != start_timeline => {
                        self.notify(Notification::AddBranchRequested {
                            start_timeline,
                            start_x: start_point.grid_x,
                            end_timeline,
                            end_x: end_point.grid_x,
                        });
                    }
                    Some(_) => {
                        // Same timeline: ignored, mode stays armed.
                        self.placement = Some(Placement::Branch {
                            first: Some((start_timeline, start_point)),
                        });
                    }
                    None => {
                        // Invalid location: mode exits without creating.
                    }
                }
            }
            Placement::Line { first: None } => {
                let g = hit::grid_point_at(&self.camera, x, y);
                self.placement = Some(Placement::Line { first: Some(g) });
            }
            Placement::Line { first: Some(g1) } => {
                let g2 = hit::grid_point_at(&self.camera, x, y);
                if g2 == g1 {
                    // Same point: ignored, mode stays armed.
                    self.placement = Some(Placement::Line { first: Some(g1) });
                } else {
                    self.notify(Notification::AddLineRequested {
                        x1: g1.0,
                        y1: g1.1,
                        x2: g2.0,
                        y2: g2.1,
                    });
                }
            }
        }
    }

    /// Preview state for the armed placement mode, derived from the live
    /// pointer position.
    fn placement_preview(&self, placement: &Placement) -> PlacementPreview {
        let hover = self.pointer.map(|(px, py)| match placement {
            Placement::Chapter | Placement::Branch { .. } => {
                match hit::insert_point_at(&self.scene, &self.camera, px, py) {
                    Some((timeline, point)) => {
                        let valid = match placement {
                            Placement::Branch { first: Some((start, _)) } => *start != timeline,
                            _ => true,
                        };
                        let (sx, sy) = self.insert_point_screen(timeline, point.grid_x);
                        PreviewPoint { sx, sy, valid }
                    }
                    None => PreviewPoint {
                        sx: px,
                        sy: py,
                        valid: false,
                    },
                }
            }
            Placement::Line { .. } => {
                let (gx, gy) = hit::grid_point_at(&self.camera, px, py);
                let (sx, sy) = self
                    .camera
                    .world_to_screen(grid_to_world(gx as f32), grid_to_world(gy as f32));
                PreviewPoint {
                    sx,
                    sy,
                    valid: true,
                }
            }
        });

        let first = match placement {
            Placement::Branch {
                first: Some((timeline, point)),
            } => {
                let (sx, sy) = self.insert_point_screen(*timeline, point.grid_x);
                Some(PreviewPoint {
                    sx,
                    sy,
                    valid: true,
                })
            }
            Placement::Line { first: Some((gx, gy)) } => {
                let (sx, sy) = self
                    .camera
                    .world_to_screen(grid_to_world(*gx as f32), grid_to_world(*gy as f32));
                Some(PreviewPoint {
                    sx,
                    sy,
                    valid: true,
                })
            }
            _ => None,
        };

        PlacementPreview {
            kind: placement.kind(),
            hover,
            first,
        }
    }

    fn insert_point_screen(&self, timeline: TimelineId, grid_x: f32) -> (f32, f32) {
        match self.scene.timeline(timeline) {
            Some(t) => self
                .camera
                .world_to_screen(t.x + grid_to_world(grid_x), t.y),
            None => (0.0, 0.0),
        }
    }

    // ─── Double-click editing ────────────────────────────────────────────

    /// Route a double-click to the matching edit notification. Returns
    /// whether anything was hit; misses fall back to normal handling.
    fn fire_edit_at(&mut self, x: f32, y: f32) -> bool {
        let Some(target) = hit::hit_test(&self.scene, &self.camera, x, y) else {
            return false;
        };
        let n = match target {
            HitTarget::Timeline { id, zone } => match zone {
                // Head/Tail route to the timeline editor, not a chapter one.
                TimelineZone::Title | TimelineZone::Head | TimelineZone::Tail => {
                    Notification::EditTimelineRequested { id }
                }
                TimelineZone::Body => return false,
            },
            HitTarget::Chapter { id, .. } => Notification::EditChapterRequested { id },
            HitTarget::Branch { id } => Notification::EditBranchRequested { id },
            HitTarget::Textbox { id } | HitTarget::TextboxHandle { id, .. } => {
                Notification::EditTextboxRequested { id }
            }
            HitTarget::Line { id } | HitTarget::LineEndpoint { id, .. } => {
                Notification::EditLineRequested { id }
            }
            HitTarget::ArcLabel { .. } => return false,
        };
        self.notify(n);
        true
    }

    // ─── Drag activation ─────────────────────────────────────────────────

    fn activate_drag(&self, target: HitTarget) -> Option<ActiveDrag> {
        let (px, py) = self.pointer?;
        let (wx, wy) = self.camera.screen_to_world(px, py);
        match target {
            HitTarget::Timeline { id, .. } => {
                let t = self.scene.timeline(id)?;
                Some(ActiveDrag::Timeline {
                    id,
                    grab: (wx - t.x, wy - t.y),
                })
            }
            HitTarget::Chapter { timeline, id } => {
                let t = self.scene.timeline(timeline)?;
                let (content_pos, chapter) = t
                    .content()
                    .enumerate()
                    .find(|(_, (_, c))| c.id == id)
                    .map(|(pos, (_, c))| (pos, c))?;
                let slots = chapter_slots(t, content_pos);
                Some(ActiveDrag::Chapter {
                    timeline,
                    id,
                    start_x: chapter.x,
                    start_screen: (px, py),
                    slots,
                    slot: None,
                })
            }
            HitTarget::ArcLabel { timeline, arc } => {
                let t = self.scene.timeline(timeline)?;
                let groups = t.chapter_groups();
                let group_pos = groups.iter().position(|g| g.arc_id() == Some(arc))?;
                let starts: SmallVec<[(usize, f32); 4]> = groups[group_pos]
                    .chapters
                    .iter()
                    .map(|&i| (i, t.chapters[i].x))
                    .collect();
                let slots = group_slots(t, group_pos);
                Some(ActiveDrag::ArcGroup {
                    timeline,
                    arc,
                    starts,
                    start_screen: (px, py),
                    slots,
                    slot: None,
                })
            }
            HitTarget::Textbox { id } => {
                let tb = self.scene.textbox(id)?;
                Some(ActiveDrag::Textbox {
                    id,
                    grab: (wx - tb.x, wy - tb.y),
                })
            }
            HitTarget::TextboxHandle { id, handle } => {
                let tb = self.scene.textbox(id)?;
                Some(ActiveDrag::TextboxResize {
                    id,
                    handle,
                    orig: (tb.x, tb.y, tb.width, tb.height),
                    start_screen: (px, py),
                })
            }
            HitTarget::Line { id } => {
                let l = self.scene.line(id)?;
                Some(ActiveDrag::LineBody {
                    id,
                    orig: (l.x1, l.y1, l.x2, l.y2),
                    start_screen: (px, py),
                })
            }
            HitTarget::LineEndpoint { id, end } => Some(ActiveDrag::LineEndpoint { id, end }),
            HitTarget::Branch { .. } => None,
        }
    }

    // ─── Drag movement ───────────────────────────────────────────────────

    fn drag_move(&mut self, x: f32, y: f32) {
        // Take the drag out to satisfy the borrow checker while the scene
        // is mutated, then put it back.
        let Gesture::Dragging(mut drag) = std::mem::take(&mut self.gesture) else {
            return;
        };
        let (wx, wy) = self.camera.screen_to_world(x, y);
        let zoom = self.camera.zoom;

        match &mut drag {
            ActiveDrag::Timeline { id, grab } => {
                if let Some(t) = self.scene.timeline_mut(*id) {
                    // Snap both axes to the grid on every move.
                    t.x = snap_world(wx - grab.0);
                    t.y = snap_world(wy - grab.1);
                }
            }
            ActiveDrag::Chapter {
                timeline,
                id,
                start_x,
                start_screen,
                slots,
                slot,
            } => {
                if let Some(t) = self.scene.timeline_mut(*timeline) {
                    // Motion along the timeline's local axis only.
                    let delta_cells = (x - start_screen.0) / zoom / GRID_CELL;
                    let head_edge = t.head().right_edge();
                    let tail_x = t.tail().x;
                    // Slot targeting follows the pointer, not the clamped
                    // span, so the outermost slots stay reachable.
                    let pointer_cells = (wx - t.x) / GRID_CELL;
                    if let Some(c) = t.chapters.iter_mut().find(|c| c.id == *id) {
                        // The span stays strictly between Head and Tail.
                        c.x = (*start_x + delta_cells).clamp(head_edge, tail_x - c.width);
                        *slot = nearest_slot(slots, pointer_cells);
                    }
                }
            }
            ActiveDrag::ArcGroup {
                timeline,
                starts,
                start_screen,
                slots,
                slot,
                ..
            } => {
                if let Some(t) = self.scene.timeline_mut(*timeline)
                    && let Some(&(_, first_start)) = starts.first()
                {
                    let delta_cells = (x - start_screen.0) / zoom / GRID_CELL;
                    let head_edge = t.head().right_edge();
                    let tail_x = t.tail().x;
                    let group_width: f32 =
                        starts.iter().map(|&(i, _)| t.chapters[i].width).sum();
                    let clamped = (first_start + delta_cells)
                        .clamp(head_edge, tail_x - group_width);
                    let delta = clamped - first_start;
                    for &(i, orig_x) in starts.iter() {
                        t.chapters[i].x = orig_x + delta;
                    }
                    let pointer_cells = (wx - t.x) / GRID_CELL;
                    *slot = nearest_slot(slots, pointer_cells);
                }
            }
            ActiveDrag::Textbox { id, grab } => {
                if let Some(tb) = self.scene.textbox_mut(*id) {
                    // Free 2D move, no snapping.
                    tb.x = wx - grab.0;
                    tb.y = wy - grab.1;
                }
            }
            ActiveDrag::TextboxResize {
                id,
                handle,
                orig,
                start_screen,
            } => {
                if let Some(tb) = self.scene.textbox_mut(*id) {
                    let dx = (x - start_screen.0) / zoom;
                    let dy = (y - start_screen.1) / zoom;
                    let (ox, oy, ow, oh) = *orig;

                    if handle.moves_left_edge() {
                        let w = (ow - dx).max(TEXTBOX_MIN_WIDTH);
                        // Opposite edge stays fixed.
                        tb.x = ox + ow - w;
                        tb.width = w;
                    } else if handle.moves_right_edge() {
                        tb.width = (ow + dx).max(TEXTBOX_MIN_WIDTH);
                    }

                    if handle.moves_top_edge() {
                        let h = (oh - dy).max(TEXTBOX_MIN_HEIGHT);
                        tb.y = oy + oh - h;
                        tb.height = h;
                    } else if handle.moves_bottom_edge() {
                        tb.height = (oh + dy).max(TEXTBOX_MIN_HEIGHT);
                    }
                }
            }
            ActiveDrag::LineBody {
                id,
                orig,
                start_screen,
            } => {
                if let Some(l) = self.scene.line_mut(*id) {
                    // Whole-cell translation from the activation point, so
                    // sub-cell drift never accumulates.
                    let dx = ((x - start_screen.0) / zoom / GRID_CELL).round() as i32;
                    let dy = ((y - start_screen.1) / zoom / GRID_CELL).round() as i32;
                    l.x1 = orig.0 + dx;
                    l.y1 = orig.1 + dy;
                    l.x2 = orig.2 + dx;
                    l.y2 = orig.3 + dy;
                }
            }
            ActiveDrag::LineEndpoint { id, end } => {
                let (gx, gy) = hit::grid_point_at(&self.camera, x, y);
                if let Some(l) = self.scene.line_mut(*id) {
                    match end {
                        LineEnd::Start => {
                            l.x1 = gx;
                            l.y1 = gy;
                        }
                        LineEnd::End => {
                            l.x2 = gx;
                            l.y2 = gy;
                        }
                    }
                }
            }
        }

        self.gesture = Gesture::Dragging(drag);
    }

    // ─── Drag commit ─────────────────────────────────────────────────────

    fn commit_drag(&mut self, drag: ActiveDrag) {
        match drag {
            ActiveDrag::Timeline { id, .. } => {
                if let Some(t) = self.scene.timeline(id) {
                    let (x, y) = (t.x, t.y);
                    self.notify(Notification::TimelineMoved { id, x, y });
                }
            }
            ActiveDrag::Chapter {
                timeline,
                id,
                slot,
                ..
            } => match slot {
                Some(slot) if slot.hovered => {
                    self.notify(Notification::ReorderChapterRequested {
                        timeline,
                        chapter: id,
                        index: slot.index,
                    });
                }
                _ => {
                    // No valid slot: ask the owner to resupply chapters so
                    // the visual layout reverts by re-pull.
                    self.notify(Notification::ChapterSyncRequested { timeline });
                }
            },
            ActiveDrag::ArcGroup {
                timeline,
                arc,
                slot,
                ..
            } => match slot {
                Some(slot) if slot.hovered => {
                    self.notify(Notification::ReorderArcRequested {
                        timeline,
                        arc,
                        group_index: slot.index,
                    });
                }
                _ => {
                    self.notify(Notification::ChapterSyncRequested { timeline });
                }
            },
            ActiveDrag::Textbox { id, .. } => {
                if let Some(tb) = self.scene.textbox(id) {
                    let (x, y) = (tb.x, tb.y);
                    self.notify(Notification::TextboxMoved { id, x, y });
                }
            }
            ActiveDrag::TextboxResize { id, orig, .. } => {
                if let Some(tb) = self.scene.textbox(id) {
                    let (x, y, width, height) = (tb.x, tb.y, tb.width, tb.height);
                    if (x, y) != (orig.0, orig.1) {
                        self.notify(Notification::TextboxMoved { id, x, y });
                    }
                    self.notify(Notification::TextboxResized { id, width, height });
                }
            }
            ActiveDrag::LineBody { id, .. } | ActiveDrag::LineEndpoint { id, .. } => {
                if let Some(l) = self.scene.line(id) {
                    let (x1, y1, x2, y2) = (l.x1, l.y1, l.x2, l.y2);
                    self.notify(Notification::LineMoved { id, x1, y1, x2, y2 });
                }
            }
        }
    }

    // ─── Overlay state for the painter ───────────────────────────────────

    fn slot_highlight(&self) -> Option<SlotHighlight> {
        let Gesture::Dragging(drag) = &self.gesture else {
            return None;
        };
        let slot = drag.slot()?;
        let timeline = match drag {
            ActiveDrag::Chapter { timeline, .. } | ActiveDrag::ArcGroup { timeline, .. } => {
                *timeline
            }
            _ => return None,
        };
        let t = self.scene.timeline(timeline)?;
        let (sx, sy) = self
            .camera
            .world_to_screen(t.x + grid_to_world(slot.grid_x), t.y);
        Some(SlotHighlight {
            sx,
            sy,
            reachable: slot.hovered,
        })
    }
}

// ─── Slot helpers ────────────────────────────────────────────────────────

/// Candidate slots for a chapter drag, excluding the two adjacent to the
/// dragged chapter (a chapter can't insert next to itself).
fn chapter_slots(t: &Timeline, content_pos: usize) -> SmallVec<[Slot; 8]> {
    t.insert_points()
        .into_iter()
        .filter(|p| p.index != content_pos && p.index != content_pos + 1)
        .map(|p| Slot {
            index: p.index,
            grid_x: p.grid_x,
            hovered: false,
        })
        .collect()
}

/// Candidate slots for an arc-group drag: group boundaries, excluding the
/// two adjacent to the dragged group.
fn group_slots(t: &Timeline, group_pos: usize) -> SmallVec<[Slot; 8]> {
    let groups = t.chapter_groups();
    let points = t.insert_points();
    let mut slots: SmallVec<[Slot; 8]> = SmallVec::new();

    // Content insertion index at the left boundary of each group, plus one
    // past the last group.
    let mut boundaries: Vec<usize> = Vec::with_capacity(groups.len() + 1);
    let mut content_idx = 0usize;
    for g in &groups {
        boundaries.push(content_idx);
        content_idx += g.chapters.len();
    }
    boundaries.push(content_idx);

    for (group_index, &content_index) in boundaries.iter().enumerate() {
        if group_index == group_pos || group_index == group_pos + 1 {
            continue;
        }
        if let Some(p) = points.iter().find(|p| p.index == content_index) {
            slots.push(Slot {
                index: group_index,
                grid_x: p.grid_x,
                hovered: false,
            });
        }
    }
    slots
}

/// Nearest candidate slot to the pointer's grid position, marked hovered
/// when within commit range.
fn nearest_slot(slots: &[Slot], center: f32) -> Option<Slot> {
    slots
        .iter()
        .min_by(|a, b| {
            (a.grid_x - center)
                .abs()
                .total_cmp(&(b.grid_x - center).abs())
        })
        .map(|s| Slot {
            hovered: (s.grid_x - center).abs() <= SLOT_HOVER_RANGE,
            ..*s
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline_with_chapters(titles: &[&str]) -> Timeline {
        let mut t = Timeline::new(&TimelineRecord {
            id: TimelineId::new("t_slots"),
            name: "T".to_string(),
            x: 0.0,
            y: 0.0,
        });
        let records: Vec<ChapterRecord> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| ChapterRecord {
                id: chron_core::id::ChapterId::new(&format!("slot_ch_{title}")),
                title: (*title).to_string(),
                timestamp: i as i64,
                arc_id: None,
                width: None,
            })
            .collect();
        t.sync_chapters(&records);
        t
    }

    #[test]
    fn chapter_slots_exclude_own_neighbors() {
        let t = timeline_with_chapters(&["a", "b", "c"]);
        // Content indices 0..3 → insertion slots 0..=3. Dragging "b"
        // (content position 1) excludes slots 1 and 2.
        let slots = chapter_slots(&t, 1);
        let indices: Vec<usize> = slots.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn nearest_slot_marks_hover_within_range() {
        let slots = [
            Slot {
                index: 0,
                grid_x: 1.0,
                hovered: false,
            },
            Slot {
                index: 3,
                grid_x: 4.0,
                hovered: false,
            },
        ];
        let s = nearest_slot(&slots, 1.3).unwrap();
        assert_eq!(s.index, 0);
        assert!(s.hovered);
        let s = nearest_slot(&slots, 2.5).unwrap();
        assert_eq!(s.index, 0);
        assert!(!s.hovered, "too far from the slot to commit");
    }

    #[test]
    fn group_slots_exclude_own_boundaries() {
        // Three singleton groups → boundaries 0..=3; dragging the middle
        // group excludes 1 and 2.
        let t = timeline_with_chapters(&["p", "q", "r"]);
        let slots = group_slots(&t, 1);
        let indices: Vec<usize> = slots.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 3]);
    }

    #[test]
    fn menu_timeline_action_notifies_immediately() {
        let mut engine = CanvasEngine::new(800.0, 600.0);
        engine.run_menu_action(MenuAction::AddTimeline, 0.0, 0.0);
        assert_eq!(
            engine.take_notifications(),
            vec![Notification::AddTimelineRequested]
        );
        assert!(engine.placement().is_none());
    }

    #[test]
    fn menu_chapter_action_arms_placement() {
        let mut engine = CanvasEngine::new(800.0, 600.0);
        engine.run_menu_action(MenuAction::AddChapter, 0.0, 0.0);
        assert!(matches!(engine.placement(), Some(Placement::Chapter)));
        assert!(engine.take_notifications().is_empty());
    }

    #[test]
    fn textbox_setter_grows_height_to_content() {
        let mut engine = CanvasEngine::new(800.0, 600.0);
        engine.set_textboxes(vec![Textbox {
            id: chron_core::id::TextboxId::new("grow"),
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 30.0,
            content: "line one\nline two\nline three\nline four".to_string(),
            font_size: 14.0,
            align_x: Default::default(),
            align_y: Default::default(),
        }]);
        let tb = engine.scene().textbox(chron_core::id::TextboxId::new("grow")).unwrap();
        assert!(tb.height > 30.0, "height must grow to fit four lines");
    }
}
