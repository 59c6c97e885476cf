//! Nearest-triangle queries over the candidate set.
//!
//! Two interchangeable implementations: a [`LinearScan`] reference and a
//! [`Bvh`] that visits only nodes closer than the best hit so far. Both
//! return the same triangle for every query point, including ties (the
//! lowest candidate index wins).

use glam::Vec3;
use smallvec::SmallVec;

use crate::decal::triangle::Triangle;
use crate::resources::BoundingBox;

/// Closest candidate for one query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index into the candidate list.
    pub index: usize,
    pub point: Vec3,
    pub distance_squared: f32,
    /// Geometric normal of the hit triangle (zero for degenerate ones).
    pub normal: Vec3,
}

pub trait NearestTriangle {
    fn triangles(&self) -> &[Triangle];

    /// Nearest candidate to `p`, `None` when empty or when `p` is not finite.
    fn nearest(&self, p: Vec3) -> Option<Hit>;

    fn len(&self) -> usize {
        self.triangles().len()
    }

    fn is_empty(&self) -> bool {
        self.triangles().is_empty()
    }
}

/// Replaces `best` when `index` is strictly closer, or equally close with a
/// lower index.
#[inline]
fn consider(best: &mut Option<Hit>, index: usize, tri: &Triangle, p: Vec3) {
    let point = tri.closest_point(p);
    let d2 = point.distance_squared(p);
    if !d2.is_finite() {
        return;
    }
    let better = match best {
        None => true,
        Some(b) => d2 < b.distance_squared || (d2 == b.distance_squared && index < b.index),
    };
    if better {
        *best = Some(Hit {
            index,
            point,
            distance_squared: d2,
            normal: tri.normal(),
        });
    }
}

// ============================================================================
// Linear scan
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct LinearScan {
    triangles: Vec<Triangle>,
}

impl LinearScan {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}

impl NearestTriangle for LinearScan {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn nearest(&self, p: Vec3) -> Option<Hit> {
        if !p.is_finite() {
            return None;
        }
        let mut best = None;
        for (index, tri) in self.triangles.iter().enumerate() {
            consider(&mut best, index, tri, p);
        }
        best
    }
}

// ============================================================================
// Bounding volume hierarchy
// ============================================================================

const LEAF_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: u32, count: u32 },
    Inner { left: u32, right: u32 },
}

#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bounds: BoundingBox,
    kind: NodeKind,
}

/// Median-split BVH over candidate triangles.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    triangles: Vec<Triangle>,
    nodes: Vec<BvhNode>,
    /// Candidate indices in leaf order.
    order: Vec<u32>,
}

impl Bvh {
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let mut bvh = Self {
            order: (0..triangles.len() as u32).collect(),
            nodes: Vec::with_capacity(triangles.len().div_ceil(LEAF_SIZE) * 2),
            triangles,
        };
        if !bvh.triangles.is_empty() {
            let centroids: Vec<Vec3> = bvh.triangles.iter().map(Triangle::centroid).collect();
            bvh.build_node(&centroids, 0, bvh.order.len());
        }
        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build_node(&mut self, centroids: &[Vec3], start: usize, end: usize) -> u32 {
        let slice = &self.order[start..end];
        let bounds = slice
            .iter()
            .map(|&i| self.triangles[i as usize].bounding_box())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        let node_index = self.nodes.len() as u32;
        let leaf = NodeKind::Leaf {
            start: start as u32,
            count: (end - start) as u32,
        };
        self.nodes.push(BvhNode { bounds, kind: leaf });

        if end - start <= LEAF_SIZE {
            return node_index;
        }

        let Some(spread) = BoundingBox::from_points(slice.iter().map(|&i| centroids[i as usize])) else {
            return node_index;
        };
        let size = spread.size();
        if !(size.max_element() > 0.0) {
            return node_index;
        }
        let axis = if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        };

        self.order[start..end].sort_unstable_by(|&a, &b| {
            centroids[a as usize][axis]
                .total_cmp(&centroids[b as usize][axis])
                .then(a.cmp(&b))
        });

        let mid = start + (end - start) / 2;
        let left = self.build_node(centroids, start, mid);
        let right = self.build_node(centroids, mid, end);
        self.nodes[node_index as usize].kind = NodeKind::Inner { left, right };
        node_index
    }
}

#[inline]
fn box_distance_squared(bounds: &BoundingBox, p: Vec3) -> f32 {
    (bounds.min - p).max(p - bounds.max).max(Vec3::ZERO).length_squared()
}

impl NearestTriangle for Bvh {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn nearest(&self, p: Vec3) -> Option<Hit> {
        if self.nodes.is_empty() || !p.is_finite() {
            return None;
        }

        let mut best: Option<Hit> = None;
        let mut stack: SmallVec<[u32; 64]> = SmallVec::new();
        stack.push(0);

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index as usize];
            // Equal distance must still be visited: it may hold a tie with a
            // lower index.
            if let Some(b) = &best
                && box_distance_squared(&node.bounds, p) > b.distance_squared
            {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { start, count } => {
                    let range = start as usize..(start + count) as usize;
                    for &index in &self.order[range] {
                        consider(&mut best, index as usize, &self.triangles[index as usize], p);
                    }
                }
                NodeKind::Inner { left, right } => {
                    let dl = box_distance_squared(&self.nodes[left as usize].bounds, p);
                    let dr = box_distance_squared(&self.nodes[right as usize].bounds, p);
                    // Pop the nearer child first.
                    if dl <= dr {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(n: usize) -> Vec<Triangle> {
        let mut out = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let o = Vec3::new(i as f32, 0.0, j as f32);
                out.push(Triangle::new(o, o + Vec3::X, o + Vec3::Z));
                out.push(Triangle::new(o + Vec3::X, o + Vec3::X + Vec3::Z, o + Vec3::Z));
            }
        }
        out
    }

    #[test]
    fn empty_index_has_no_hit() {
        assert!(LinearScan::default().nearest(Vec3::ZERO).is_none());
        assert!(Bvh::build(Vec::new()).nearest(Vec3::ZERO).is_none());
    }

    #[test]
    fn bvh_matches_linear_scan() {
        let tris = grid(8);
        let linear = LinearScan::new(tris.clone());
        let bvh = Bvh::build(tris);
        assert!(bvh.node_count() > 1);

        for k in 0..200 {
            let t = k as f32 * 0.173;
            let p = Vec3::new((t * 1.7).sin() * 5.0 + 4.0, t.cos() * 2.0, (t * 0.9).cos() * 5.0 + 4.0);
            let a = linear.nearest(p).unwrap();
            let b = bvh.nearest(p).unwrap();
            assert_eq!(a.index, b.index, "query {p}");
            assert_eq!(a.distance_squared, b.distance_squared);
        }
    }

    #[test]
    fn shared_edge_tie_goes_to_lower_index() {
        let tris = grid(2);
        // On the diagonal shared by triangles 0 and 1.
        let p = Vec3::new(0.5, 1.0, 0.5);
        assert_eq!(LinearScan::new(tris.clone()).nearest(p).unwrap().index, 0);
        assert_eq!(Bvh::build(tris).nearest(p).unwrap().index, 0);
    }
}
