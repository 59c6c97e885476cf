use glam::{Vec2, Vec3};

use crate::resources::geometry::Geometry;

#[must_use]
pub fn create_box(width: f32, height: f32, depth: f32) -> Geometry {
    let w = width / 2.0;
    let h = height / 2.0;
    let d = depth / 2.0;

    // 24 vertices (4 per face), each face: (normal, 4 corners CCW seen from outside)
    let faces: [(Vec3, [[f32; 3]; 4]); 6] = [
        // Front (+Z)
        (Vec3::Z, [[-w, -h, d], [w, -h, d], [w, h, d], [-w, h, d]]),
        // Back (-Z)
        (Vec3::NEG_Z, [[-w, -h, -d], [-w, h, -d], [w, h, -d], [w, -h, -d]]),
        // Top (+Y)
        (Vec3::Y, [[-w, h, -d], [-w, h, d], [w, h, d], [w, h, -d]]),
        // Bottom (-Y)
        (Vec3::NEG_Y, [[-w, -h, -d], [w, -h, -d], [w, -h, d], [-w, -h, d]]),
        // Right (+X)
        (Vec3::X, [[w, -h, -d], [w, h, -d], [w, h, d], [w, -h, d]]),
        // Left (-X)
        (Vec3::NEG_X, [[-w, -h, -d], [-w, -h, d], [-w, h, d], [-w, h, -d]]),
    ];

    let face_uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);

    for (normal, corners) in faces {
        for (corner, uv) in corners.iter().zip(face_uvs) {
            positions.push(Vec3::from_array(*corner));
            normals.push(normal);
            uvs.push(uv);
        }
    }

    // 2 triangles per face, CCW: 0, 1, 2,  0, 2, 3
    let indices: Vec<u32> = (0..6)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect();

    let mut geo = Geometry::from_positions(positions)
        .with_normals(normals)
        .with_uvs(uvs)
        .with_indices(indices);

    geo.compute_bounding_volume();

    geo
}
