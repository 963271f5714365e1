pub mod camera;
pub mod geometry;
pub mod id;
pub mod model;
pub mod scene;

pub use camera::{Camera, Glide, MAX_ZOOM, MIN_ZOOM};
pub use geometry::{GRID_CELL, WorldRect};
pub use id::{ArcId, BranchId, ChapterId, LineId, TextboxId, TimelineId};
pub use model::*;
pub use scene::Scene;
