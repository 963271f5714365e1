//! The scene: every entity collection the canvas works with.
//!
//! Collections are owned exclusively by the scene; each setter call replaces
//! its collection wholesale (the external owner is the source of truth),
//! except positions being actively dragged, which the interaction engine
//! mutates in place for live feedback and reconciles on drop.
//!
//! Malformed references (a branch naming a timeline id that doesn't exist)
//! are never errors: the entity is skipped during rendering and hit-testing
//! and a warning is logged.

use crate::geometry::{GRID_CELL, WorldRect, grid_to_world};
use crate::id::{BranchId, LineId, TextboxId, TimelineId};
use crate::model::{
    ArcRecord, Branch, ChapterRecord, FreeLine, Textbox, Timeline, TimelineRecord,
};
use serde::{Deserialize, Serialize};

/// Approximate width of one title character in world units, used for the
/// export bounding box title allowance.
const TITLE_CHAR_WIDTH: f32 = 8.0;
/// Vertical allowance above a timeline's line (chapter labels, title).
const TIMELINE_ABOVE: f32 = 36.0;
/// Vertical allowance below (tick marks, arc labels).
const TIMELINE_BELOW: f32 = 24.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub timelines: Vec<Timeline>,
    pub branches: Vec<Branch>,
    pub lines: Vec<FreeLine>,
    pub textboxes: Vec<Textbox>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Data-update surface (replace semantics) ─────────────────────────

    pub fn set_timelines(&mut self, records: &[TimelineRecord]) {
        // Carry over derived chapters/arcs for timelines that survive the
        // replace; brand-new ids start empty.
        let old = std::mem::take(&mut self.timelines);
        self.timelines = records
            .iter()
            .map(|record| {
                if let Some(mut existing) = old.iter().find(|t| t.id == record.id).cloned() {
                    existing.name = record.name.clone();
                    existing.x = record.x;
                    existing.y = record.y;
                    existing
                } else {
                    Timeline::new(record)
                }
            })
            .collect();
    }

    pub fn add_timeline(&mut self, record: &TimelineRecord) {
        if self.timeline(record.id).is_some() {
            log::warn!("add_timeline: duplicate id {}, ignoring", record.id);
            return;
        }
        self.timelines.push(Timeline::new(record));
    }

    pub fn remove_timeline(&mut self, id: TimelineId) {
        self.timelines.retain(|t| t.id != id);
        // Branches referencing the removed timeline become dangling and are
        // skipped at paint/hit time; the owner replaces them on next sync.
    }

    pub fn set_chapters(&mut self, timeline_id: TimelineId, records: &[ChapterRecord]) {
        match self.timeline_mut(timeline_id) {
            Some(t) => t.sync_chapters(records),
            None => log::warn!("set_chapters: unknown timeline {timeline_id}"),
        }
    }

    pub fn set_arcs(&mut self, timeline_id: TimelineId, records: Vec<ArcRecord>) {
        match self.timeline_mut(timeline_id) {
            Some(t) => t.set_arcs(records),
            None => log::warn!("set_arcs: unknown timeline {timeline_id}"),
        }
    }

    pub fn set_branches(&mut self, branches: Vec<Branch>) {
        for b in &branches {
            if b.start_timeline == b.end_timeline {
                log::warn!("set_branches: branch {} connects a timeline to itself", b.id);
            }
        }
        self.branches = branches;
    }

    pub fn set_lines(&mut self, lines: Vec<FreeLine>) {
        self.lines = lines;
    }

    pub fn set_textboxes(&mut self, textboxes: Vec<Textbox>) {
        self.textboxes = textboxes;
    }

    // ─── Lookups ─────────────────────────────────────────────────────────

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.iter().find(|t| t.id == id)
    }

    pub fn timeline_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.iter_mut().find(|t| t.id == id)
    }

    pub fn textbox(&self, id: TextboxId) -> Option<&Textbox> {
        self.textboxes.iter().find(|t| t.id == id)
    }

    pub fn textbox_mut(&mut self, id: TextboxId) -> Option<&mut Textbox> {
        self.textboxes.iter_mut().find(|t| t.id == id)
    }

    pub fn line(&self, id: LineId) -> Option<&FreeLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn line_mut(&mut self, id: LineId) -> Option<&mut FreeLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| b.id == id)
    }

    /// World-space endpoints of a branch, or `None` if either timeline
    /// reference dangles (the branch is then skipped entirely).
    pub fn branch_endpoints(&self, branch: &Branch) -> Option<((f32, f32), (f32, f32))> {
        let start = self.timeline(branch.start_timeline)?;
        let end = self.timeline(branch.end_timeline)?;
        Some((
            (start.x + grid_to_world(branch.start_x), start.y),
            (end.x + grid_to_world(branch.end_x), end.y),
        ))
    }

    /// World-space bounding rectangle of a timeline: its full Head→Tail
    /// span plus label allowances, widened for the title text.
    pub fn timeline_bounds(&self, timeline: &Timeline) -> WorldRect {
        let title_allowance = timeline.name.chars().count() as f32 * TITLE_CHAR_WIDTH;
        let span = timeline.span_world().max(title_allowance);
        WorldRect::new(
            timeline.x,
            timeline.y - TIMELINE_ABOVE,
            span,
            TIMELINE_ABOVE + TIMELINE_BELOW,
        )
    }

    pub fn textbox_bounds(textbox: &Textbox) -> WorldRect {
        WorldRect::new(textbox.x, textbox.y, textbox.width, textbox.height)
    }

    pub fn line_bounds(line: &FreeLine) -> WorldRect {
        let x0 = grid_to_world(line.x1.min(line.x2) as f32);
        let y0 = grid_to_world(line.y1.min(line.y2) as f32);
        let x1 = grid_to_world(line.x1.max(line.x2) as f32);
        let y1 = grid_to_world(line.y1.max(line.y2) as f32);
        WorldRect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Bounding box over every entity in the scene, in world units.
    /// `None` when the scene is empty. Used to size the export surface.
    pub fn content_bounds(&self) -> Option<WorldRect> {
        let mut acc: Option<WorldRect> = None;
        let mut merge = |r: WorldRect| {
            acc = Some(match acc {
                Some(prev) => prev.union(&r),
                None => r,
            });
        };

        for t in &self.timelines {
            merge(self.timeline_bounds(t));
        }
        for tb in &self.textboxes {
            merge(Self::textbox_bounds(tb));
        }
        for l in &self.lines {
            merge(Self::line_bounds(l));
        }
        for b in &self.branches {
            if let Some((start, end)) = self.branch_endpoints(b) {
                merge(WorldRect::new(start.0, start.1, 0.0, 0.0));
                merge(WorldRect::new(end.0, end.1, 0.0, 0.0));
            }
        }

        acc
    }

    /// Grid-cell-aligned anchor suitable for placing a new entity near a
    /// world point.
    pub fn snapped_anchor(wx: f32, wy: f32) -> (f32, f32) {
        (
            (wx / GRID_CELL).round() * GRID_CELL,
            (wy / GRID_CELL).round() * GRID_CELL,
        )
    }
}
