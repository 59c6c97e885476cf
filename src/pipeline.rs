//! Load-time orchestration.
//!
//! Runs once per loaded product: locate the print area, switch it to decal
//! rendering, subdivide it, wrap it onto the body and frame the camera.
//! Every failure is logged and degrades to something viewable; none of them
//! abort the sequence.

use log::{info, warn};

use crate::config::{DecalConfig, FramingConfig, SceneConfig, SpatialIndexKind};
use crate::decal::{
    Bvh, LinearScan, NearestTriangle, ProjectionStats, collect_candidates, project, tessellate_mesh,
};
use crate::errors::{ConformError, Result};
use crate::resources::primitives::fallback_placeholder;
use crate::scene::framing::fit_to_box;
use crate::scene::{Camera, MeshKey, Scene};

/// What [`DecalPipeline::prepare`] did to the scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrepareReport {
    /// The located print-area mesh.
    pub patch: Option<MeshKey>,
    pub tessellated: bool,
    pub candidates: usize,
    pub projection: Option<ProjectionStats>,
    /// Placeholder inserted because nothing else could be framed.
    pub fallback: Option<MeshKey>,
    pub framed: bool,
}

/// Result of conforming a single patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub tessellated: bool,
    pub candidates: usize,
    pub stats: ProjectionStats,
}

#[derive(Debug, Clone, Default)]
pub struct DecalPipeline {
    pub decal: DecalConfig,
    pub framing: FramingConfig,
    /// Look switches for the scene-setup host; carried, not interpreted here.
    pub scene: SceneConfig,
}

impl DecalPipeline {
    pub fn new(decal: DecalConfig, framing: FramingConfig, scene: SceneConfig) -> Result<Self> {
        decal.validate()?;
        framing.validate()?;
        Ok(Self {
            decal,
            framing,
            scene,
        })
    }

    /// Full load-time sequence for a successfully loaded scene.
    pub fn prepare(&self, scene: &mut Scene, camera: &mut Camera) -> PrepareReport {
        let mut report = PrepareReport::default();

        match scene.find_patch(&self.decal.patch_token) {
            Some(key) => {
                report.patch = Some(key);
                match self.conform_patch(scene, key) {
                    Ok(patch) => {
                        report.tessellated = patch.tessellated;
                        report.candidates = patch.candidates;
                        report.projection = Some(patch.stats);
                    }
                    Err(err) => warn!("Print area left flat: {err}"),
                }
            }
            None => {
                let err = ConformError::MissingPatch(self.decal.patch_token.clone());
                warn!("{err}; skipping decal stage");
            }
        }

        let (framed, fallback) = self.frame(scene, camera);
        report.framed = framed;
        report.fallback = fallback;
        report
    }

    /// Recovery path for a failed mesh load: show the placeholder and frame it.
    pub fn recover_from_load_failure(
        &self,
        error: &ConformError,
        scene: &mut Scene,
        camera: &mut Camera,
    ) -> PrepareReport {
        warn!("Product mesh unavailable ({error}), using placeholder");
        let key = scene.add_mesh(fallback_placeholder());
        let framed = self.frame_mesh(scene, key, camera);
        PrepareReport {
            fallback: Some(key),
            framed,
            ..Default::default()
        }
    }

    /// Decal stage for one patch: render state, subdivision, projection.
    ///
    /// On [`ConformError::NoCandidates`] the patch keeps its subdivided but
    /// unprojected shape.
    pub fn conform_patch(&self, scene: &mut Scene, key: MeshKey) -> Result<PatchReport> {
        let patch = scene
            .get_mesh_mut(key)
            .ok_or_else(|| ConformError::MissingPatch(self.decal.patch_token.clone()))?;
        patch.apply_decal_state();
        let tessellated = tessellate_mesh(
            patch,
            self.decal.tessellation_iterations,
            self.decal.tessellation_ceiling,
        );

        let Some(patch_bounds) = patch.world_bounding_box() else {
            return Err(ConformError::NoCandidates {
                patch: patch.name.clone(),
            });
        };

        let body_bounds = scene.bounding_box_filtered(|k, _| k != key);
        let tolerance = self.decal.tolerance.resolve(body_bounds.as_ref());
        let triangles = collect_candidates(scene, key, &patch_bounds, tolerance.margin);
        let candidates = triangles.len();

        let index: Box<dyn NearestTriangle> = match self.decal.spatial_index {
            SpatialIndexKind::Linear => Box::new(LinearScan::new(triangles)),
            SpatialIndexKind::Bvh => Box::new(Bvh::build(triangles)),
        };

        let patch = scene
            .get_mesh_mut(key)
            .ok_or_else(|| ConformError::MissingPatch(self.decal.patch_token.clone()))?;
        let stats = project(patch, index.as_ref(), &tolerance)?;
        info!(
            "Conformed '{}' onto {candidates} candidates ({} of {} vertices moved)",
            patch.name, stats.moved, stats.vertices
        );

        Ok(PatchReport {
            tessellated,
            candidates,
            stats,
        })
    }

    /// Fits the camera to the scene, inserting the placeholder when the
    /// scene bounds are unusable. Returns (framed, inserted placeholder).
    pub fn frame(&self, scene: &mut Scene, camera: &mut Camera) -> (bool, Option<MeshKey>) {
        let fitted = scene
            .bounding_box()
            .ok_or(ConformError::DegenerateBounds)
            .and_then(|bbox| fit_to_box(&bbox, camera, &self.framing));

        match fitted {
            Ok(()) => (true, None),
            Err(err) => {
                warn!("Cannot frame scene ({err}), inserting placeholder");
                let key = scene.add_mesh(fallback_placeholder());
                (self.frame_mesh(scene, key, camera), Some(key))
            }
        }
    }

    fn frame_mesh(&self, scene: &Scene, key: MeshKey, camera: &mut Camera) -> bool {
        let result = scene
            .get_mesh(key)
            .and_then(|mesh| mesh.world_bounding_box())
            .ok_or(ConformError::DegenerateBounds)
            .and_then(|bbox| fit_to_box(&bbox, camera, &self.framing));
        if let Err(err) = &result {
            warn!("Camera left unchanged: {err}");
        }
        result.is_ok()
    }
}
