pub mod display;
pub mod hit;
pub mod metrics;
pub mod paint;
pub mod scene_enc;
pub mod text;

pub use display::{DisplayList, DrawCmd, MenuView, PlacementKind, PlacementPreview, PreviewPoint, SlotHighlight, TextRun, Theme};
pub use hit::{Handle, HitTarget, HoverSide, LineEnd, TimelineZone, hit_test};
pub use paint::{FrameInput, build_frame};
