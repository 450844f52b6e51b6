pub mod canvas;
pub mod drag;
pub mod input;
pub mod resize;
pub mod shortcuts;
pub mod tools;

pub use canvas::{CanvasController, EventOutcome};
pub use input::{Cursor, InputEvent, Modifiers};
pub use tools::CanvasTool;
