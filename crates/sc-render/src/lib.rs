pub mod encode;
pub mod hit;
pub mod paint;

pub use encode::{LabelOverlay, encode_scene, label_overlays};
pub use hit::{find_topmost_at, is_point_in_node};
pub use paint::{DisplayList, DrawOp, PaintInput, build_display_list};
