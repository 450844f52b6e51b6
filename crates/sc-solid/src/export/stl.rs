//! Binary STL.
//!
//! Layout: 80-byte header, little-endian `u32` triangle count, then per
//! triangle a normal and three vertices as `f32` triples and a zero
//! `u16` attribute word.

use crate::mesh::Mesh;
use crate::solid::GeneratedSolid;
use glam::Mat4;
use std::f32::consts::FRAC_PI_2;

const HEADER: &[u8] = b"binary STL";
const TRIANGLE_BYTES: usize = 50;

/// Copy of the solid for STL: presentation transform dropped, tilted
/// +90° about x for z-up consumers.
pub fn prepare(solid: &GeneratedSolid) -> Mesh {
    let tilt = Mat4::from_rotation_x(FRAC_PI_2);
    let mut out = Mesh::new();
    for part in &solid.geometry.parts {
        out.append(&part.mesh.transformed(&tilt));
    }
    out
}

pub fn encode(mesh: &Mesh) -> Vec<u8> {
    let count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(84 + count * TRIANGLE_BYTES);
    let mut header = [0u8; 80];
    header[..HEADER.len()].copy_from_slice(HEADER);
    buf.extend_from_slice(&header);
    buf.extend_from_slice(&(count as u32).to_le_bytes());

    for (tri, nrm) in mesh.positions.chunks_exact(3).zip(mesh.normals.chunks_exact(3)) {
        for v in std::iter::once(nrm[0]).chain(tri.iter().copied()) {
            for c in v.to_array() {
                buf.extend_from_slice(&c.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }
    buf
}
