#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod decal;
pub mod errors;
pub mod export;
pub mod pipeline;
pub mod resources;
pub mod scene;

pub use config::{DecalConfig, FramingConfig, ProjectionTolerance, SceneConfig, SpatialIndexKind};
pub use decal::{Bvh, LinearScan, NearestTriangle, ProjectionStats, TextureSwap, Triangle};
pub use errors::{ConformError, Result};
pub use export::{ExportSettings, export_camera, export_size};
pub use pipeline::{DecalPipeline, PrepareReport};
pub use resources::primitives::*;
pub use resources::{BoundingBox, Geometry, Image, Material, Mesh, Texture};
pub use scene::{Camera, MeshKey, Scene, ViewFramer, ViewOffset};
