use glam::Vec3;

use crate::resources::BoundingBox;

/// World-space triangle used as a projection target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit geometric normal following the winding, or zero for a
    /// zero-area triangle.
    pub fn normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a).normalize_or_zero()
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min: self.a.min(self.b).min(self.c),
            max: self.a.max(self.b).max(self.c),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }

    /// Closest point to `p` on the triangle, interior and edges included.
    ///
    /// Voronoi-region walk; degenerate triangles fall back to the closest
    /// point on their three edges.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let q = self.closest_point_regions(p);
        if q.is_finite() {
            q
        } else {
            self.closest_point_on_edges(p)
        }
    }

    pub fn distance_squared(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    fn closest_point_regions(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;

        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }

        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }

    fn closest_point_on_edges(&self, p: Vec3) -> Vec3 {
        [
            closest_on_segment(p, self.a, self.b),
            closest_on_segment(p, self.b, self.c),
            closest_on_segment(p, self.c, self.a),
        ]
        .into_iter()
        .fold(self.a, |best, q| {
            if q.distance_squared(p) < best.distance_squared(p) {
                q
            } else {
                best
            }
        })
    }
}

fn closest_on_segment(p: Vec3, start: Vec3, end: Vec3) -> Vec3 {
    let dir = end - start;
    let len_sq = dir.length_squared();
    if len_sq <= f32::EPSILON {
        return start;
    }
    let t = ((p - start).dot(dir) / len_sq).clamp(0.0, 1.0);
    start + dir * t
}
