use glam::{Affine3A, Vec2, Vec3};
use uuid::Uuid;

// ============================================================================
// Bounding Volumes
// ============================================================================

/// Axis-aligned box over world- or model-space points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;
        for p in points {
            min = min.min(p);
            max = max.max(p);
            any = true;
        }
        any.then_some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 { (self.min + self.max) * 0.5 }
    pub fn size(&self) -> Vec3 { self.max - self.min }

    /// Largest edge length.
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);

        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self { min: new_min, max: new_max }
    }

    /// Grows the box by `amount` on every side.
    pub fn expand_by_scalar(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(amount),
            max: self.max + Vec3::splat(amount),
        }
    }

    /// Closed-interval overlap test (touching boxes intersect).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && self.max.cmpge(p).all()
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Non-finite, or not strictly positive in size on every axis.
    ///
    /// A box that is flat along any axis cannot be framed by distance alone
    /// and counts as degenerate.
    pub fn is_degenerate(&self) -> bool {
        !self.is_finite() || self.size().cmple(Vec3::ZERO).any()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

// ============================================================================
// Geometry
// ============================================================================

/// CPU-side triangle geometry.
///
/// Positions are mandatory; normals, UVs and an index buffer are optional.
/// Without indices every three consecutive vertices form one triangle.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub uuid: Uuid,

    positions: Vec<Vec3>,
    normals: Option<Vec<Vec3>>,
    uvs: Option<Vec<Vec2>>,
    indices: Option<Vec<u32>>,

    data_version: u64,

    bounding_box: Option<BoundingBox>,
    bounding_sphere: Option<BoundingSphere>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            positions: Vec::new(),
            normals: None,
            uvs: None,
            indices: None,
            data_version: 0,
            bounding_box: None,
            bounding_sphere: None,
        }
    }

    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let mut geometry = Self::new();
        geometry.positions = positions;
        geometry
    }

    #[must_use]
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.set_uvs(Some(uvs));
        self
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.set_normals(Some(normals));
        self
    }

    #[must_use]
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.set_indices(Some(indices));
        self
    }

    pub fn data_version(&self) -> u64 {
        self.data_version
    }

    fn touch(&mut self) {
        self.data_version = self.data_version.wrapping_add(1);
    }

    // === Attribute accessors ===

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Mutable positions. Bumps the data version; callers are expected to
    /// recompute normals and bounds afterwards.
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        self.touch();
        &mut self.positions
    }

    pub fn normals(&self) -> Option<&[Vec3]> {
        self.normals.as_deref()
    }

    /// Sets the normal attribute. A buffer whose length does not match the
    /// vertex count is dropped.
    pub fn set_normals(&mut self, normals: Option<Vec<Vec3>>) {
        self.normals = normals.filter(|n| n.len() == self.positions.len());
        self.touch();
    }

    pub fn uvs(&self) -> Option<&[Vec2]> {
        self.uvs.as_deref()
    }

    /// Sets the UV attribute. A buffer whose length does not match the
    /// vertex count is dropped.
    pub fn set_uvs(&mut self, uvs: Option<Vec<Vec2>>) {
        self.uvs = uvs.filter(|uv| uv.len() == self.positions.len());
        self.touch();
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn set_indices(&mut self, indices: Option<Vec<u32>>) {
        self.indices = indices;
        self.touch();
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Vertex indices of every complete triangle. Triangles referencing an
    /// out-of-range vertex are skipped.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let count = self.positions.len();
        let tri_count = self.triangle_count();
        (0..tri_count).filter_map(move |t| {
            let tri = match &self.indices {
                Some(indices) => [
                    indices[t * 3] as usize,
                    indices[t * 3 + 1] as usize,
                    indices[t * 3 + 2] as usize,
                ],
                None => [t * 3, t * 3 + 1, t * 3 + 2],
            };
            tri.iter().all(|&i| i < count).then_some(tri)
        })
    }

    /// Model-space corner positions of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.triangle_indices()
            .map(|[a, b, c]| [self.positions[a], self.positions[b], self.positions[c]])
    }

    /// Expands the index buffer so that no vertex is shared between triangles.
    pub fn to_non_indexed(&self) -> Geometry {
        if self.indices.is_none() {
            let mut copy = self.clone();
            copy.uuid = Uuid::new_v4();
            return copy;
        }

        let tri_count = self.triangle_count();
        let mut positions = Vec::with_capacity(tri_count * 3);
        let mut normals = self.normals.as_ref().map(|_| Vec::with_capacity(tri_count * 3));
        let mut uvs = self.uvs.as_ref().map(|_| Vec::with_capacity(tri_count * 3));

        for tri in self.triangle_indices() {
            for i in tri {
                positions.push(self.positions[i]);
                if let (Some(out), Some(src)) = (normals.as_mut(), self.normals.as_ref()) {
                    out.push(src[i]);
                }
                if let (Some(out), Some(src)) = (uvs.as_mut(), self.uvs.as_ref()) {
                    out.push(src[i]);
                }
            }
        }

        let mut geometry = Geometry::from_positions(positions);
        geometry.normals = normals;
        geometry.uvs = uvs;
        geometry
    }

    // === Derived data ===

    /// Area-weighted vertex normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for [i0, i1, i2] in self.triangle_indices() {
            let v0 = self.positions[i0];
            let v1 = self.positions[i1];
            let v2 = self.positions[i2];

            // |cross| = 2 * area
            let face_normal = (v1 - v0).cross(v2 - v0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for n in &mut normals {
            *n = n.normalize_or_zero();
        }

        self.normals = Some(normals);
        self.touch();
    }

    /// Recomputes the AABB and a sphere centered on the AABB center.
    pub fn compute_bounding_volume(&mut self) {
        let Some(bounds) = BoundingBox::from_points(self.positions.iter().copied()) else {
            self.bounding_box = None;
            self.bounding_sphere = None;
            return;
        };

        let center = bounds.center();
        let max_dist_sq = self
            .positions
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0_f32, f32::max);

        self.bounding_box = Some(bounds);
        self.bounding_sphere = Some(BoundingSphere {
            center,
            radius: max_dist_sq.sqrt(),
        });
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn bounding_sphere(&self) -> Option<BoundingSphere> {
        self.bounding_sphere
    }

    /// Exact world-space AABB of the vertices under `world`.
    pub fn world_bounding_box(&self, world: &Affine3A) -> Option<BoundingBox> {
        BoundingBox::from_points(self.positions.iter().map(|p| world.transform_point3(*p)))
    }

    // === Renderer upload views ===

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> Option<&[u8]> {
        self.normals.as_deref().map(bytemuck::cast_slice)
    }

    pub fn uv_bytes(&self) -> Option<&[u8]> {
        self.uvs.as_deref().map(bytemuck::cast_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry::from_positions(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ])
        .with_indices(vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn non_indexed_expansion_duplicates_shared_vertices() {
        let flat = quad().to_non_indexed();
        assert_eq!(flat.vertex_count(), 6);
        assert_eq!(flat.triangle_count(), 2);
        assert!(flat.indices().is_none());
        assert_eq!(flat.uvs().map(<[Vec2]>::len), Some(6));
        assert_eq!(flat.positions()[3], Vec3::ZERO);
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let geometry = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_indices(vec![0, 1, 2, 0, 1, 9]);
        assert_eq!(geometry.triangles().count(), 1);
    }

    #[test]
    fn mismatched_uvs_are_dropped() {
        let geometry = Geometry::from_positions(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_uvs(vec![Vec2::ZERO]);
        assert!(geometry.uvs().is_none());
    }

    #[test]
    fn byte_views_cover_every_vertex() {
        let geometry = quad();
        assert_eq!(geometry.position_bytes().len(), 4 * 12);
        assert_eq!(geometry.uv_bytes().map(<[u8]>::len), Some(4 * 8));
        assert!(geometry.normal_bytes().is_none());
    }
}
