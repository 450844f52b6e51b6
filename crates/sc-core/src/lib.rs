pub mod config;
pub mod document;
pub mod frame;
pub mod id;
pub mod model;
pub mod params;
pub mod viewport;

pub use config::EditorConfig;
pub use document::{DocEvent, Document, SubscriptionId};
pub use frame::{FrameCoalescer, FrameToken};
pub use id::NodeId;
pub use model::*;
pub use params::{ParamStore, SolidParameters};
pub use viewport::{Viewport, ZoomLimits};
