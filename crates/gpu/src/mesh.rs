//! CPU-side geometry for the globe and the marker spike.

use std::f64::consts::{PI, TAU};

/// Length of the marker spike: one unit past the globe's surface.
pub const MARKER_LENGTH: f64 = 21.0;

/// Vertex streams plus an optional triangle index list.
///
/// `normals` and `texcoords` are either empty or one per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// A vertex stream a program can ask for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexAttribute {
    Position,
    Normal,
    Texcoord,
}

impl VertexAttribute {
    pub fn name(self) -> &'static str {
        match self {
            VertexAttribute::Position => "a_position",
            VertexAttribute::Normal => "a_normal",
            VertexAttribute::Texcoord => "a_texcoord",
        }
    }

    pub fn components(self) -> u32 {
        match self {
            VertexAttribute::Texcoord => 2,
            _ => 3,
        }
    }
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Elements a draw over the whole mesh covers.
    pub fn element_count(&self) -> u32 {
        if self.is_indexed() {
            self.index_count()
        } else {
            self.vertex_count()
        }
    }

    pub fn provides(&self, attribute: VertexAttribute) -> bool {
        let n = self.positions.len();
        n > 0
            && match attribute {
                VertexAttribute::Position => true,
                VertexAttribute::Normal => self.normals.len() == n,
                VertexAttribute::Texcoord => self.texcoords.len() == n,
            }
    }
}

/// UV sphere centred on the origin.
///
/// Rings run from the north pole (+Y) to the south pole; each ring has
/// `longitude_segments + 1` vertices so the seam carries both u = 0 and
/// u = 1. Texture u runs right to left (`1 - u`). Triangles wind
/// counter-clockwise seen from outside.
pub fn build_sphere_mesh(radius: f64, longitude_segments: u32, latitude_segments: u32) -> MeshData {
    let lon_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);
    let ring = lon_segs + 1;
    let vertex_count = (ring * (lat_segs + 1)) as usize;

    let mut mesh = MeshData {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        texcoords: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity((lon_segs * lat_segs * 6) as usize),
    };

    for y in 0..=lat_segs {
        let v = y as f64 / lat_segs as f64;
        let (sin_phi, cos_phi) = (PI * v).sin_cos();
        for x in 0..=lon_segs {
            let u = x as f64 / lon_segs as f64;
            let (sin_theta, cos_theta) = (TAU * u).sin_cos();
            let n = [cos_theta * sin_phi, cos_phi, sin_theta * sin_phi];
            mesh.positions.push([
                (radius * n[0]) as f32,
                (radius * n[1]) as f32,
                (radius * n[2]) as f32,
            ]);
            mesh.normals.push([n[0] as f32, n[1] as f32, n[2] as f32]);
            mesh.texcoords.push([(1.0 - u) as f32, v as f32]);
        }
    }

    for x in 0..lon_segs {
        for y in 0..lat_segs {
            let i0 = y * ring + x;
            let i1 = i0 + 1;
            let i2 = i0 + ring;
            let i3 = i2 + 1;
            mesh.indices.extend_from_slice(&[i0, i1, i2, i2, i1, i3]);
        }
    }

    mesh
}

/// Two vertices: the origin and one unit along +Z.
pub fn build_unit_segment_mesh() -> MeshData {
    build_segment_mesh(1.0)
}

pub fn build_segment_mesh(length: f64) -> MeshData {
    MeshData {
        positions: vec![[0.0, 0.0, 0.0], [0.0, 0.0, length as f32]],
        ..MeshData::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f64; 3] {
        [
            (a[0] - b[0]) as f64,
            (a[1] - b[1]) as f64,
            (a[2] - b[2]) as f64,
        ]
    }

    fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn sphere_counts_match_segments() {
        let mesh = build_sphere_mesh(20.0, 48, 48);
        assert_eq!(mesh.vertex_count(), 49 * 49);
        assert_eq!(mesh.index_count(), 48 * 48 * 6);
        assert!(mesh.provides(VertexAttribute::Normal));
        assert!(mesh.provides(VertexAttribute::Texcoord));
        assert!(mesh.indices.iter().all(|&i| i < mesh.vertex_count()));
    }

    #[test]
    fn sphere_vertices_sit_on_radius() {
        let mesh = build_sphere_mesh(20.0, 12, 8);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 20.0).abs() < 1e-4, "radius {r}");
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
        assert_eq!(mesh.positions[0], [0.0, 20.0, 0.0]);
        assert_eq!(mesh.texcoords[0], [1.0, 0.0]);
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = build_sphere_mesh(1.0, 16, 16);
        let mut checked = 0;
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [
                mesh.positions[tri[0] as usize],
                mesh.positions[tri[1] as usize],
                mesh.positions[tri[2] as usize],
            ];
            let n = cross(sub(b, a), sub(c, a));
            let area2 = n[0] * n[0] + n[1] * n[1] + n[2] * n[2];
            if area2 < 1e-10 {
                // Pole triangles collapse.
                continue;
            }
            let centroid = [
                (a[0] + b[0] + c[0]) as f64,
                (a[1] + b[1] + c[1]) as f64,
                (a[2] + b[2] + c[2]) as f64,
            ];
            let outward = n[0] * centroid[0] + n[1] * centroid[1] + n[2] * centroid[2];
            assert!(outward > 0.0);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn sphere_is_deterministic() {
        assert_eq!(build_sphere_mesh(20.0, 48, 48), build_sphere_mesh(20.0, 48, 48));
    }

    #[test]
    fn unit_segment_has_two_points() {
        let mesh = build_unit_segment_mesh();
        assert_eq!(mesh.positions, vec![[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(!mesh.is_indexed());
        assert_eq!(mesh.element_count(), 2);
        assert!(mesh.provides(VertexAttribute::Position));
        assert!(!mesh.provides(VertexAttribute::Normal));
        assert_eq!(build_segment_mesh(MARKER_LENGTH).positions[1], [0.0, 0.0, 21.0]);
    }
}
