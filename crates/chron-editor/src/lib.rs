pub mod engine;
pub mod events;
pub mod export;
pub mod gesture;
pub mod input;
pub mod menu;

pub use engine::CanvasEngine;
pub use events::Notification;
pub use export::{ExportFrame, export_scene};
pub use gesture::{Gesture, Placement};
pub use input::InputEvent;
pub use menu::{Menu, MenuAction};
