//! Extrusion of a planar shape into a closed, optionally bevelled solid.
//!
//! The shape is swept along +z from 0 to `depth`. With a bevel, the walls
//! are pushed outward by `bevel_size` and rounded over `bevel_segments`
//! quarter-circle steps into caps that sit `bevel_thickness` in front of
//! and behind the walls, so the solid spans `-thickness..depth+thickness`.
//! The caps keep the original outline.

use crate::error::ShapeBuildError;
use crate::mesh::Mesh;
use crate::shape::PlanarShape;
use glam::{DVec2, Vec3};
use std::f64::consts::FRAC_PI_2;

/// Longest allowed bevel offset vector, in multiples of the bevel size.
/// Very sharp corners would otherwise throw vertices far away.
const MAX_MITER: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeSettings {
    pub depth: f64,
    pub bevel_enabled: bool,
    pub bevel_thickness: f64,
    pub bevel_size: f64,
    pub bevel_segments: u32,
}

impl Default for ExtrudeSettings {
    fn default() -> Self {
        Self {
            depth: 1.0,
            bevel_enabled: false,
            bevel_thickness: 0.0,
            bevel_size: 0.0,
            bevel_segments: 0,
        }
    }
}

impl ExtrudeSettings {
    pub fn flat(depth: f64) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    fn bevel_steps(&self) -> u32 {
        if self.bevel_enabled { self.bevel_segments.max(1) } else { 0 }
    }
}

/// One ring of the sweep: where it sits and how far it is pushed out.
#[derive(Debug, Clone, Copy)]
struct Layer {
    z: f64,
    offset: f64,
}

fn layers(s: &ExtrudeSettings) -> Vec<Layer> {
    let n = s.bevel_steps();
    let (t, size) = if n > 0 { (s.bevel_thickness, s.bevel_size) } else { (0.0, 0.0) };
    let bevel = |b: u32| {
        let a = b as f64 / n as f64 * FRAC_PI_2;
        (t * a.cos(), size * a.sin())
    };

    let mut out = Vec::with_capacity(2 * n as usize + 2);
    for b in 0..n {
        let (z, offset) = bevel(b);
        out.push(Layer { z: -z, offset });
    }
    out.push(Layer { z: 0.0, offset: size });
    out.push(Layer { z: s.depth, offset: size });
    for b in (0..n).rev() {
        let (z, offset) = bevel(b);
        out.push(Layer { z: s.depth + z, offset });
    }
    out
}

/// Per-vertex direction that offsets both adjacent edges by one unit
/// away from the material.
fn bevel_vectors(contour: &[DVec2]) -> Vec<DVec2> {
    let n = contour.len();
    let edge_normal = |i: usize| {
        let d = contour[(i + 1) % n] - contour[i];
        DVec2::new(d.y, -d.x).normalize_or_zero()
    };
    (0..n)
        .map(|i| {
            let n1 = edge_normal((i + n - 1) % n);
            let n2 = edge_normal(i);
            let denom = 1.0 + n1.dot(n2);
            let m = if denom < 1e-6 { n1 } else { (n1 + n2) / denom };
            m.clamp_length_max(MAX_MITER)
        })
        .collect()
}

fn vertex(p: DVec2, z: f64) -> Vec3 {
    Vec3::new(p.x as f32, p.y as f32, z as f32)
}

/// Extrude `shape` into a closed mesh with outward-facing triangles.
pub fn extrude(shape: &PlanarShape, settings: &ExtrudeSettings) -> Result<Mesh, ShapeBuildError> {
    let contours: Vec<&[DVec2]> = std::iter::once(shape.outer.as_slice())
        .chain(shape.holes.iter().map(Vec::as_slice))
        .collect();
    let rings = layers(settings);
    let mut mesh = Mesh::new();

    // Caps.
    let cap = triangulate(shape)?;
    let (front, back) = match (rings.first(), rings.last()) {
        (Some(f), Some(b)) => (f.z, b.z),
        _ => (0.0, settings.depth),
    };
    let flat: Vec<DVec2> = contours.iter().flat_map(|c| c.iter().copied()).collect();
    for tri in cap.chunks_exact(3) {
        let [a, b, c] = [flat[tri[0]], flat[tri[1]], flat[tri[2]]];
        // Cap triangles wind like the outer loop (counter-clockwise); the
        // front cap faces -z, so it is reversed.
        mesh.push_triangle(vertex(a, front), vertex(c, front), vertex(b, front));
        mesh.push_triangle(vertex(a, back), vertex(b, back), vertex(c, back));
    }

    // Walls, including the bevel bands.
    for contour in &contours {
        let dirs = bevel_vectors(contour);
        let n = contour.len();
        let ring = |layer: &Layer| -> Vec<Vec3> {
            contour
                .iter()
                .zip(&dirs)
                .map(|(p, d)| vertex(*p + *d * layer.offset, layer.z))
                .collect()
        };
        let rings_pts: Vec<Vec<Vec3>> = rings.iter().map(ring).collect();
        for pair in rings_pts.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.push_triangle(lo[i], lo[j], hi[j]);
                mesh.push_triangle(lo[i], hi[j], hi[i]);
            }
        }
    }

    Ok(mesh)
}

/// Flat cap triangles as indices into the outer loop followed by each hole.
pub fn triangulate(shape: &PlanarShape) -> Result<Vec<usize>, ShapeBuildError> {
    let mut data = Vec::with_capacity(2 * shape.outer.len());
    let mut hole_starts = Vec::with_capacity(shape.holes.len());
    for p in &shape.outer {
        data.extend([p.x, p.y]);
    }
    for hole in &shape.holes {
        hole_starts.push(data.len() / 2);
        for p in hole {
            data.extend([p.x, p.y]);
        }
    }
    let tris = earcutr::earcut(&data, &hole_starts, 2).map_err(|e| ShapeBuildError::Triangulation(format!("{e:?}")))?;
    if tris.is_empty() {
        return Err(ShapeBuildError::Triangulation("no triangles produced".to_string()));
    }

    // earcut emits either winding; make every triangle counter-clockwise.
    let pts: Vec<DVec2> = data.chunks_exact(2).map(|c| DVec2::new(c[0], c[1])).collect();
    let mut out = Vec::with_capacity(tris.len());
    for t in tris.chunks_exact(3) {
        let (a, b, c) = (pts[t[0]], pts[t[1]], pts[t[2]]);
        if (b - a).perp_dot(c - a) < 0.0 {
            out.extend([t[0], t[2], t[1]]);
        } else {
            out.extend([t[0], t[1], t[2]]);
        }
    }
    Ok(out)
}

/// Flat triangulated outline at z = 0; the cheap proxy used for centring.
pub fn flat_proxy(shape: &PlanarShape) -> Result<Mesh, ShapeBuildError> {
    let cap = triangulate(shape)?;
    let flat: Vec<DVec2> = std::iter::once(&shape.outer)
        .chain(&shape.holes)
        .flat_map(|c| c.iter().copied())
        .collect();
    let mut mesh = Mesh::new();
    for tri in cap.chunks_exact(3) {
        mesh.push_triangle(vertex(flat[tri[0]], 0.0), vertex(flat[tri[1]], 0.0), vertex(flat[tri[2]], 0.0));
    }
    Ok(mesh)
}
