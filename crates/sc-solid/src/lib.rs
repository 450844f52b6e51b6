//! Vector outline → extruded solid.
//!
//! Pipeline: [`markup`] validation, [`extract`] of filled outlines,
//! [`shape`] building, [`extrude`] with bevel, [`solid`] generation with a
//! shared [`material`] cache, then the [`scene`] around it and
//! [`export`] to STL, glTF/GLB and PNG. [`registry`] keeps one scene per
//! solid canvas node.

pub mod error;
pub mod export;
pub mod extract;
pub mod extrude;
pub mod intake;
pub mod markup;
pub mod material;
pub mod mesh;
pub mod registry;
pub mod rotate;
pub mod scene;
pub mod shape;
pub mod solid;

pub use error::{ExportError, ParseError, ShapeBuildError, SolidError};
pub use export::{DownloadSink, ExportFormat, ExportRequest, MemorySink};
pub use intake::{FileUpload, begin_outline_load, finish_outline_load, upload_environment};
pub use material::{Material, MaterialCache, MaterialSignature};
pub use mesh::{Aabb, Mesh};
pub use registry::SolidRegistry;
pub use rotate::RotationDrag;
pub use scene::{Presentation, SceneComposer, SolidHandle};
pub use solid::{GeneratedSolid, SolidGenerator, SolidRequest};
