//! Decal module
//!
//! Conforms the flat print-area patch to the product surface:
//! - tessellate: midpoint subdivision so the patch can bend
//! - candidates: broad-phase triangle gathering around the patch
//! - spatial: nearest-triangle queries (linear scan or BVH)
//! - shrinkwrap: per-vertex projection with an anti z-fighting lift
//! - swap: texture replacement that keeps the UV framing

pub mod candidates;
pub mod shrinkwrap;
pub mod spatial;
pub mod swap;
pub mod tessellate;
pub mod triangle;

pub use candidates::collect_candidates;
pub use shrinkwrap::{ProjectionStats, project};
pub use spatial::{Bvh, Hit, LinearScan, NearestTriangle};
pub use swap::{TextureEvent, TextureSender, TextureSwap};
pub use tessellate::{subdivide, tessellate_mesh};
pub use triangle::Triangle;
