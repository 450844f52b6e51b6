//! Solid Generator: outline markup + parameters → centred, scaled solid.
//!
//! Geometry is memoised on the outline text and the extrusion inputs;
//! material-only changes reuse it. Materials come from a
//! [`MaterialCache`] owned by the generator, so parts with the same
//! signature share one instance until the cache is cleared.

use crate::error::SolidError;
use crate::extract::{self, ExtractedOutlines};
use crate::extrude::{self, ExtrudeSettings};
use crate::material::{Material, MaterialCache, MaterialSignature};
use crate::mesh::{Aabb, Mesh};
use crate::shape::PlanarShape;
use glam::{Mat4, Quat, Vec3};
use sc_core::model::Color;
use sc_core::params::SolidParameters;
use std::cell::Cell;
use std::f32::consts::FRAC_PI_4;
use std::rc::Rc;

/// The largest outline dimension maps to this many model units.
pub const CANONICAL_SIZE: f64 = 100.0;
/// Scene units per unit of the depth parameter.
pub const DEPTH_SCALE: f32 = 5.0;
/// Hole bevels are slightly larger than outer ones so shared edges do not
/// z-fight.
pub const HOLE_BEVEL_FACTOR: f64 = 1.05;
pub const MIN_BEVEL_SEGMENTS: u32 = 4;
pub const MAX_BEVEL_SEGMENTS: u32 = 64;
pub const MIN_CURVE_SEGMENTS: u32 = 8;

// ─── Request ─────────────────────────────────────────────────────────────

/// Inputs of one generation, resolved from a node's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidRequest {
    pub depth: f64,
    pub bevel_enabled: bool,
    pub bevel_thickness: f64,
    pub bevel_size: f64,
    pub bevel_segments: u32,
    pub override_color: Option<Color>,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub transmission: f32,
    pub env_map_intensity: f32,
}

impl SolidRequest {
    pub fn from_params(p: &SolidParameters) -> Self {
        Self {
            depth: (p.depth * DEPTH_SCALE) as f64,
            bevel_enabled: p.bevel.enabled,
            bevel_thickness: p.bevel.thickness as f64,
            bevel_size: p.bevel.size as f64,
            bevel_segments: p.bevel.segments.min(MAX_BEVEL_SEGMENTS),
            override_color: p.material.override_color,
            roughness: p.material.roughness,
            metalness: p.material.metalness,
            clearcoat: p.material.clearcoat,
            transmission: p.material.transmission,
            env_map_intensity: p.effective_env_intensity(),
        }
    }

    fn geometry_key(&self, outline: &str) -> GeometryKey {
        GeometryKey {
            outline: outline.to_string(),
            depth: self.depth.to_bits(),
            bevel_enabled: self.bevel_enabled,
            bevel_thickness: self.bevel_thickness.to_bits(),
            bevel_size: self.bevel_size.to_bits(),
            bevel_segments: self.bevel_segments,
        }
    }

    /// Extrusion settings in pre-scale outline units.
    fn extrude_settings(&self, scale: f64, is_hole: bool) -> ExtrudeSettings {
        let k = if is_hole { HOLE_BEVEL_FACTOR } else { 1.0 };
        ExtrudeSettings {
            depth: self.depth,
            bevel_enabled: self.bevel_enabled,
            bevel_thickness: self.bevel_thickness / scale * k,
            bevel_size: self.bevel_size / scale * k,
            bevel_segments: self.bevel_segments.clamp(MIN_BEVEL_SEGMENTS, MAX_BEVEL_SEGMENTS),
        }
    }

    fn curve_segments(&self) -> u32 {
        self.bevel_segments
            .min(MAX_BEVEL_SEGMENTS)
            .saturating_mul(2)
            .max(MIN_CURVE_SEGMENTS)
    }

    fn material_for(&self, fill: Color, is_hole: bool) -> MaterialSignature {
        MaterialSignature {
            color: self.override_color.unwrap_or(fill),
            roughness: self.roughness,
            metalness: self.metalness,
            clearcoat: self.clearcoat,
            transmission: self.transmission,
            env_map_intensity: self.env_map_intensity,
            is_hole,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GeometryKey {
    outline: String,
    depth: u64,
    bevel_enabled: bool,
    bevel_thickness: u64,
    bevel_size: u64,
    bevel_segments: u32,
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// One extruded shape, already centred, in outline units.
#[derive(Debug, Clone, PartialEq)]
pub struct PartGeometry {
    pub mesh: Mesh,
    pub fill: Color,
    pub is_hole: bool,
    /// Source path index; later paths draw over earlier ones.
    pub render_order: usize,
}

#[derive(Debug)]
pub struct SolidGeometry {
    pub parts: Vec<PartGeometry>,
    /// Outline units → model units.
    pub scale: f32,
    disposed: Cell<bool>,
}

impl SolidGeometry {
    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

/// A generated solid: shared geometry, one material per part, and the
/// presentation transform (scale, y flip, 45° turn).
#[derive(Debug, Clone)]
pub struct GeneratedSolid {
    pub geometry: Rc<SolidGeometry>,
    pub materials: Vec<Rc<Material>>,
    pub transform: Mat4,
}

impl GeneratedSolid {
    pub fn parts(&self) -> impl Iterator<Item = (&PartGeometry, &Rc<Material>)> {
        self.geometry.parts.iter().zip(&self.materials)
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.parts.is_empty()
    }

    /// All parts baked through `self.transform` and then `outer`.
    pub fn baked(&self, outer: &Mat4) -> Mesh {
        let m = *outer * self.transform;
        let mut out = Mesh::new();
        for part in &self.geometry.parts {
            out.append(&part.mesh.transformed(&m));
        }
        out
    }

    pub fn bounds(&self) -> Aabb {
        self.baked(&Mat4::IDENTITY).bounds()
    }
}

/// Scale factor mapping the larger declared dimension to [`CANONICAL_SIZE`].
pub fn canonical_scale(width: f64, height: f64) -> f64 {
    if width == 0.0 || height == 0.0 {
        return 1.0;
    }
    CANONICAL_SIZE / width.max(height)
}

/// 45° turn about the vertical axis.
pub fn presentation_rotation() -> Quat {
    Quat::from_rotation_y(FRAC_PI_4)
}

/// Uniform scale with the y axis flipped from canvas (down) to scene (up).
pub fn presentation_scale(scale: f32) -> Vec3 {
    Vec3::new(scale, -scale, scale)
}

pub fn presentation_transform(scale: f32) -> Mat4 {
    Mat4::from_quat(presentation_rotation()) * Mat4::from_scale(presentation_scale(scale))
}

fn build_geometry(extracted: &ExtractedOutlines, req: &SolidRequest) -> SolidGeometry {
    let scale = canonical_scale(extracted.width, extracted.height);
    let curve_segments = req.curve_segments();

    let mut shapes: Vec<(usize, Color, PlanarShape)> = Vec::new();
    for (index, outline) in extracted.outlines.iter().enumerate() {
        let (built, errors) = PlanarShape::from_loops(outline.flatten(curve_segments), outline.fill_rule);
        for e in errors {
            log::warn!("outline {index}: {e}");
        }
        for shape in built {
            shapes.push((index, outline.fill, shape.apply_spread(false, 0.0)));
        }
    }

    // Centre on a flat proxy; the bevelled meshes are built once, below.
    let mut bounds = Aabb::EMPTY;
    shapes.retain(|(index, _, shape)| match extrude::flat_proxy(shape) {
        Ok(proxy) => {
            bounds = bounds.union(proxy.bounds());
            true
        }
        Err(e) => {
            log::warn!("outline {index}: {e}");
            false
        }
    });
    let center = if bounds.is_empty() { Vec3::ZERO } else { bounds.center() };

    let mut parts = Vec::with_capacity(shapes.len());
    for (render_order, fill, shape) in shapes {
        let is_hole = false;
        let settings = req.extrude_settings(scale, is_hole);
        let z = if is_hole { -settings.depth / 4.0 } else { -settings.depth / 2.0 };
        match extrude::extrude(&shape, &settings) {
            Ok(mut mesh) => {
                mesh.translate(Vec3::new(-center.x, -center.y, z as f32));
                parts.push(PartGeometry {
                    mesh,
                    fill,
                    is_hole,
                    render_order,
                });
            }
            Err(e) => log::warn!("outline {render_order}: {e}"),
        }
    }

    if parts.is_empty() {
        log::warn!("no extrudable outlines found");
    }
    SolidGeometry {
        parts,
        scale: scale as f32,
        disposed: Cell::new(false),
    }
}

// ─── Generator ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct SolidGenerator {
    materials: MaterialCache,
    current: Option<(GeometryKey, Rc<SolidGeometry>)>,
    builds: usize,
}

impl SolidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the solid for `outline` under `req`.
    ///
    /// On a parse error the previous geometry stays current. A new outline
    /// disposes the previous geometry and clears the material cache.
    pub fn generate(&mut self, outline: &str, req: &SolidRequest) -> Result<GeneratedSolid, SolidError> {
        let key = req.geometry_key(outline);
        let cached = match &self.current {
            Some((k, g)) if *k == key => Some(g.clone()),
            _ => None,
        };
        let geometry = match cached {
            Some(g) => g,
            None => {
                let extracted = extract::extract(outline)?;
                let geometry = Rc::new(build_geometry(&extracted, req));
                self.builds += 1;
                if let Some((old_key, old)) = self.current.take() {
                    old.dispose();
                    if old_key.outline != key.outline {
                        self.materials.clear();
                    }
                }
                self.current = Some((key, geometry.clone()));
                geometry
            }
        };

        let materials = geometry
            .parts
            .iter()
            .map(|p| self.materials.get_or_create(&req.material_for(p.fill, p.is_hole)))
            .collect();
        Ok(GeneratedSolid {
            transform: presentation_transform(geometry.scale),
            geometry,
            materials,
        })
    }

    /// Number of geometry builds so far.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Release everything: current geometry and every cached material.
    pub fn dispose(&mut self) {
        if let Some((_, g)) = self.current.take() {
            g.dispose();
        }
        self.materials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_SQUARES: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 200 100">
        <rect x="0" y="0" width="90" height="100" fill="#3498db"/>
        <rect x="110" y="0" width="90" height="100" fill="#3498db"/>
    </svg>"##;

    #[test]
    fn scale_maps_larger_side_to_canonical() {
        assert_eq!(canonical_scale(200.0, 100.0), 0.5);
        assert_eq!(canonical_scale(0.0, 100.0), 1.0);
    }

    #[test]
    fn segment_counts_are_floored() {
        let mut req = SolidRequest::from_params(&SolidParameters::default());
        req.bevel_segments = 1;
        assert_eq!(req.curve_segments(), 8);
        assert_eq!(req.extrude_settings(1.0, false).bevel_segments, 4);
        req.bevel_segments = 6;
        assert_eq!(req.curve_segments(), 12);
    }

    #[test]
    fn huge_segment_counts_are_capped() {
        let mut params = SolidParameters::default();
        params.bevel.segments = u32::MAX;
        let mut req = SolidRequest::from_params(&params);
        assert_eq!(req.bevel_segments, MAX_BEVEL_SEGMENTS);

        req.bevel_segments = u32::MAX / 2 + 1;
        assert_eq!(req.curve_segments(), 2 * MAX_BEVEL_SEGMENTS);
        assert_eq!(req.extrude_settings(1.0, false).bevel_segments, MAX_BEVEL_SEGMENTS);
    }

    #[test]
    fn hole_bevel_is_enlarged() {
        let req = SolidRequest::from_params(&SolidParameters::default());
        let outer = req.extrude_settings(0.5, false);
        let hole = req.extrude_settings(0.5, true);
        assert_eq!(outer.bevel_thickness, 2.0);
        assert!((hole.bevel_size / outer.bevel_size - 1.05).abs() < 1e-12);
    }

    #[test]
    fn same_colored_parts_share_material() {
        let mut generator = SolidGenerator::new();
        let solid = generator
            .generate(TWO_SQUARES, &SolidRequest::from_params(&SolidParameters::default()))
            .unwrap();
        assert_eq!(solid.geometry.parts.len(), 2);
        assert!(Rc::ptr_eq(&solid.materials[0], &solid.materials[1]));
        assert_eq!(generator.material_count(), 1);
    }

    #[test]
    fn material_change_reuses_geometry() {
        let mut generator = SolidGenerator::new();
        let mut params = SolidParameters::default();
        let a = generator.generate(TWO_SQUARES, &SolidRequest::from_params(&params)).unwrap();
        params.material.roughness = 0.7;
        let b = generator.generate(TWO_SQUARES, &SolidRequest::from_params(&params)).unwrap();
        assert_eq!(generator.builds(), 1);
        assert!(Rc::ptr_eq(&a.geometry, &b.geometry));
        assert!(!Rc::ptr_eq(&a.materials[0], &b.materials[0]));

        params.depth = 2.0;
        let c = generator.generate(TWO_SQUARES, &SolidRequest::from_params(&params)).unwrap();
        assert_eq!(generator.builds(), 2);
        assert!(a.geometry.is_disposed());
        assert!(!c.geometry.is_disposed());
    }

    #[test]
    fn parse_error_keeps_previous_geometry() {
        let mut generator = SolidGenerator::new();
        let req = SolidRequest::from_params(&SolidParameters::default());
        let a = generator.generate(TWO_SQUARES, &req).unwrap();
        assert!(generator.generate("<nope/>", &req).is_err());
        assert!(!a.geometry.is_disposed());
        let again = generator.generate(TWO_SQUARES, &req).unwrap();
        assert!(Rc::ptr_eq(&a.geometry, &again.geometry));
    }

    #[test]
    fn dispose_releases_cached_materials() {
        let mut generator = SolidGenerator::new();
        let solid = generator
            .generate(TWO_SQUARES, &SolidRequest::from_params(&SolidParameters::default()))
            .unwrap();
        generator.dispose();
        assert!(solid.geometry.is_disposed());
        assert!(solid.materials[0].is_disposed());
        assert_eq!(generator.material_count(), 0);
    }
}
