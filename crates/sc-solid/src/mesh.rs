//! Triangle soup with flat normals.

use glam::{Mat3, Mat4, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::MAX),
        max: Vec3::splat(f32::MIN),
    };

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(mut self, other: Aabb) -> Aabb {
        if !other.is_empty() {
            self.include(other.min);
            self.include(other.max);
        }
        self
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Non-indexed triangles: every three positions form one face, with one
/// normal per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a counter-clockwise face. Degenerate faces are dropped.
    pub fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let n = (b - a).cross(c - a);
        let len = n.length();
        if len <= f32::EPSILON * 1e-3 {
            return;
        }
        let n = n / len;
        self.positions.extend([a, b, c]);
        self.normals.extend([n, n, n]);
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.positions.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    pub fn bounds(&self) -> Aabb {
        let mut bb = Aabb::EMPTY;
        for p in &self.positions {
            bb.include(*p);
        }
        bb
    }

    /// Enclosed volume by the divergence theorem. Positive when faces
    /// wind outward.
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.as_dvec3().dot(b.as_dvec3().cross(c.as_dvec3())) / 6.0)
            .sum()
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Bake `m` into a copy. Mirroring transforms flip the winding back so
    /// faces keep pointing outward.
    pub fn transformed(&self, m: &Mat4) -> Mesh {
        let normal_m = Mat3::from_mat4(*m).inverse().transpose();
        let flip = m.determinant() < 0.0;
        let mut out = Mesh {
            positions: Vec::with_capacity(self.positions.len()),
            normals: Vec::with_capacity(self.normals.len()),
        };
        for (tri, nrm) in self.positions.chunks_exact(3).zip(self.normals.chunks_exact(3)) {
            let mut p = [0, 1, 2].map(|i| m.transform_point3(tri[i]));
            let mut n = [0, 1, 2].map(|i| (normal_m * nrm[i]).normalize_or_zero());
            if flip {
                p.swap(1, 2);
                n.swap(1, 2);
            }
            out.positions.extend(p);
            out.normals.extend(n);
        }
        out
    }

    pub fn append(&mut self, other: &Mesh) {
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetra() -> Mesh {
        let (o, x, y, z) = (Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z);
        let mut m = Mesh::new();
        m.push_triangle(o, y, x);
        m.push_triangle(o, x, z);
        m.push_triangle(o, z, y);
        m.push_triangle(x, y, z);
        m
    }

    #[test]
    fn tetrahedron_volume_is_a_sixth() {
        assert!((tetra().signed_volume() - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn mirroring_keeps_volume_positive() {
        let m = tetra().transformed(&Mat4::from_scale(Vec3::new(2.0, -1.0, 1.0)));
        assert!((m.signed_volume() - 2.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_faces_are_dropped() {
        let mut m = Mesh::new();
        m.push_triangle(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(m.is_empty());
    }

    #[test]
    fn bounds_union() {
        let bb = tetra().bounds().union(Aabb::EMPTY);
        assert_eq!(bb.center(), Vec3::splat(0.5));
        assert!(Aabb::EMPTY.is_empty());
    }
}
