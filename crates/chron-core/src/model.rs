//! Entity records and derived visual state.
//!
//! The external document owner hands in plain records (`TimelineRecord`,
//! `ChapterRecord`, `ArcRecord`, …); this module derives the visual layout
//! the canvas actually works with: packed chapter spans bracketed by
//! synthetic Head/Tail boundary chapters, auto-computed widths, and
//! contiguous arc groupings.

use crate::geometry::GRID_CELL;
use crate::id::{ArcId, BranchId, ChapterId, LineId, TextboxId, TimelineId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Color ───────────────────────────────────────────────────────────────

/// An RGBA color. Arc colors arrive from the external owner as hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Parse a hex color string: `#RGB`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let mut vals = [0u8; 4];
                for (i, pair) in bytes.chunks(2).enumerate() {
                    vals[i] = hex_val(pair[0])? * 16 + hex_val(pair[1])?;
                }
                if bytes.len() == 6 {
                    vals[3] = 255;
                }
                Some(Self::rgba(vals[0], vals[1], vals[2], vals[3]))
            }
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

// ─── Style enums ─────────────────────────────────────────────────────────

/// Stroke style shared by branches and free lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

/// Endpoint glyph shared by branches and free lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointStyle {
    #[default]
    None,
    Dot,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignY {
    #[default]
    Top,
    Middle,
    Bottom,
}

// ─── External records ────────────────────────────────────────────────────

/// A timeline as supplied by the external owner: just identity and anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub id: TimelineId,
    pub name: String,
    /// World position of the anchor point (left end of the line).
    pub x: f32,
    pub y: f32,
}

/// A raw chapter record. Order along the timeline follows `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub id: ChapterId,
    pub title: String,
    pub timestamp: i64,
    pub arc_id: Option<ArcId>,
    /// Explicit span override in grid units; otherwise auto-computed
    /// from the title length.
    pub width: Option<u32>,
}

/// Arc rendering metadata, used purely for color/label lookup while
/// grouping chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub id: ArcId,
    pub name: String,
    pub color: Color,
    pub order: u32,
}

// ─── Visual chapters ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterRole {
    /// Synthetic leftmost boundary, grid position 0, width 1.
    Head,
    /// Synthetic rightmost boundary, positioned after the last content span.
    Tail,
    Content,
}

/// A chapter laid out on a timeline. Positions and widths are grid units
/// relative to the timeline anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub x: f32,
    pub width: f32,
    pub arc_id: Option<ArcId>,
    pub role: ChapterRole,
}

impl Chapter {
    pub fn right_edge(&self) -> f32 {
        self.x + self.width
    }

    pub fn is_boundary(&self) -> bool {
        !matches!(self.role, ChapterRole::Content)
    }
}

/// Auto span for a chapter without an explicit width override.
pub fn auto_width(title: &str) -> f32 {
    (title.chars().count() as f32 / 5.0).ceil().max(1.0)
}

// ─── Timeline ────────────────────────────────────────────────────────────

/// A valid insertion slot between two adjacent chapters.
///
/// `index` is the content insertion index the slot maps to (0 = before the
/// first content chapter); `grid_x` is where the slot sits visually.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertPoint {
    pub index: usize,
    pub grid_x: f32,
}

/// Identity of a contiguous chapter group: the arc it belongs to, or the
/// lone chapter itself when unassigned, so two adjacent unassigned
/// chapters never share a key and never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Arc(ArcId),
    Chapter(ChapterId),
}

/// A contiguous run of content chapters sharing one arc (or a singleton
/// unassigned chapter).
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterGroup {
    pub key: GroupKey,
    /// Indices into `Timeline::chapters` (content chapters only).
    pub chapters: SmallVec<[usize; 4]>,
}

impl ChapterGroup {
    pub fn arc_id(&self) -> Option<ArcId> {
        match self.key {
            GroupKey::Arc(id) => Some(id),
            GroupKey::Chapter(_) => None,
        }
    }
}

/// A timeline with its derived visual chapter layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: TimelineId,
    pub name: String,
    pub x: f32,
    pub y: f32,
    /// Head, content chapters in order, Tail. Invariant: content chapters
    /// lie strictly between Head's right edge and Tail's left edge.
    pub chapters: SmallVec<[Chapter; 8]>,
    /// Arc metadata for this timeline, sorted by `order`.
    pub arcs: Vec<ArcRecord>,
}

impl Timeline {
    pub fn new(record: &TimelineRecord) -> Self {
        let mut t = Self {
            id: record.id,
            name: record.name.clone(),
            x: record.x,
            y: record.y,
            chapters: SmallVec::new(),
            arcs: Vec::new(),
        };
        t.sync_chapters(&[]);
        t
    }

    /// Rebuild the visual chapter list from raw records.
    ///
    /// Records are ordered by timestamp, widths auto-computed where not
    /// overridden, content packed from Head's right edge, and fresh
    /// Head/Tail boundary chapters created around them.
    pub fn sync_chapters(&mut self, records: &[ChapterRecord]) {
        let mut ordered: Vec<&ChapterRecord> = records.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);

        let mut chapters: SmallVec<[Chapter; 8]> = SmallVec::new();
        chapters.push(Chapter {
            id: ChapterId::head(),
            title: "Head".to_string(),
            x: 0.0,
            width: 1.0,
            arc_id: None,
            role: ChapterRole::Head,
        });

        let mut cursor = 1.0;
        for record in &ordered {
            let width = record
                .width
                .map_or_else(|| auto_width(&record.title), |w| w.max(1) as f32);
            chapters.push(Chapter {
                id: record.id,
                title: record.title.clone(),
                x: cursor,
                width,
                arc_id: record.arc_id,
                role: ChapterRole::Content,
            });
            cursor += width;
        }

        // An empty timeline keeps a one-cell gap so it still offers a
        // single insertion slot between Head and Tail.
        let tail_x = cursor.max(2.0);
        chapters.push(Chapter {
            id: ChapterId::tail(),
            title: "Tail".to_string(),
            x: tail_x,
            width: 1.0,
            arc_id: None,
            role: ChapterRole::Tail,
        });

        self.chapters = chapters;
    }

    pub fn set_arcs(&mut self, mut arcs: Vec<ArcRecord>) {
        arcs.sort_by_key(|a| a.order);
        self.arcs = arcs;
    }

    pub fn head(&self) -> &Chapter {
        &self.chapters[0]
    }

    pub fn tail(&self) -> &Chapter {
        &self.chapters[self.chapters.len() - 1]
    }

    /// Content chapters with their indices into `chapters`.
    pub fn content(&self) -> impl Iterator<Item = (usize, &Chapter)> {
        self.chapters
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_boundary())
    }

    pub fn arc(&self, id: ArcId) -> Option<&ArcRecord> {
        self.arcs.iter().find(|a| a.id == id)
    }

    /// Total span in grid units, Head through Tail inclusive.
    pub fn span_cells(&self) -> f32 {
        self.tail().right_edge()
    }

    /// Total span in world units.
    pub fn span_world(&self) -> f32 {
        self.span_cells() * GRID_CELL
    }

    /// All insertion slots: one between each pair of adjacent chapters,
    /// Head and Tail included.
    pub fn insert_points(&self) -> Vec<InsertPoint> {
        self.chapters
            .windows(2)
            .enumerate()
            .map(|(i, pair)| InsertPoint {
                index: i,
                grid_x: (pair[0].right_edge() + pair[1].x) / 2.0,
            })
            .collect()
    }

    /// Group content chapters into contiguous arc runs.
    pub fn chapter_groups(&self) -> Vec<ChapterGroup> {
        let mut groups: Vec<ChapterGroup> = Vec::new();
        for (idx, chapter) in self.content() {
            let start_new = match (&chapter.arc_id, groups.last()) {
                // Unassigned chapters never join an existing group.
                (None, _) => true,
                (Some(arc), Some(last)) => last.arc_id() != Some(*arc),
                (Some(_), None) => true,
            };
            if start_new {
                groups.push(ChapterGroup {
                    key: match chapter.arc_id {
                        Some(arc) => GroupKey::Arc(arc),
                        None => GroupKey::Chapter(chapter.id),
                    },
                    chapters: SmallVec::new(),
                });
            }
            if let Some(group) = groups.last_mut() {
                group.chapters.push(idx);
            }
        }
        groups
    }
}

// ─── Branches, lines, textboxes ──────────────────────────────────────────

/// A curved connector between two *different* timelines, anchored at grid
/// offsets along each. Same-timeline branches are rejected at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub start_timeline: TimelineId,
    pub start_x: f32,
    pub end_timeline: TimelineId,
    pub end_x: f32,
    pub line_style: LineStyle,
    pub start_cap: EndpointStyle,
    pub end_cap: EndpointStyle,
}

/// A free-floating straight connector between two grid points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeLine {
    pub id: LineId,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub line_style: LineStyle,
    pub start_cap: EndpointStyle,
    pub end_cap: EndpointStyle,
}

/// Minimum textbox width in world units.
pub const TEXTBOX_MIN_WIDTH: f32 = 50.0;
/// Minimum textbox height in world units.
pub const TEXTBOX_MIN_HEIGHT: f32 = 30.0;

/// A positioned, resizable rich-text annotation in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Textbox {
    pub id: TextboxId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub content: String,
    pub font_size: f32,
    pub align_x: AlignX,
    pub align_y: AlignY,
}
