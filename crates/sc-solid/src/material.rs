//! Physically based materials and the signature-keyed cache that shares
//! them between parts.

use sc_core::model::Color;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Everything that distinguishes one part's material from another's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSignature {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub transmission: f32,
    pub env_map_intensity: f32,
    pub is_hole: bool,
}

/// Hashable form of [`MaterialSignature`]: 8-bit color and exact float bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    rgba: [u8; 4],
    params: [u32; 5],
    is_hole: bool,
}

impl MaterialSignature {
    pub fn key(&self) -> MaterialKey {
        MaterialKey {
            rgba: self.color.to_rgba8(),
            params: [
                self.roughness.to_bits(),
                self.metalness.to_bits(),
                self.clearcoat.to_bits(),
                self.transmission.to_bits(),
                self.env_map_intensity.to_bits(),
            ],
            is_hole: self.is_hole,
        }
    }
}

/// A resolved material, shared by reference count.
#[derive(Debug)]
pub struct Material {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
    pub reflectivity: f32,
    pub env_map_intensity: f32,
    pub double_sided: bool,
    /// Depth bias; holes and outer faces use opposite signs.
    pub polygon_offset: f32,
    disposed: Cell<bool>,
}

impl Material {
    pub fn new(sig: &MaterialSignature) -> Self {
        Self {
            color: sig.color,
            roughness: sig.roughness.max(0.05),
            metalness: sig.metalness,
            clearcoat: sig.clearcoat.max(0.05),
            clearcoat_roughness: 0.05,
            transmission: sig.transmission,
            reflectivity: 1.0,
            env_map_intensity: sig.env_map_intensity,
            double_sided: true,
            polygon_offset: if sig.is_hole { -1.0 } else { 1.0 },
            disposed: Cell::new(false),
        }
    }

    pub fn dispose(&self) {
        self.disposed.set(true);
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

#[derive(Debug, Default)]
pub struct MaterialCache {
    entries: HashMap<MaterialKey, Rc<Material>>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared material for `sig`, created on first request.
    pub fn get_or_create(&mut self, sig: &MaterialSignature) -> Rc<Material> {
        self.entries
            .entry(sig.key())
            .or_insert_with(|| {
                log::trace!("new material {}", sig.color.to_hex());
                Rc::new(Material::new(sig))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dispose and forget every cached material.
    pub fn clear(&mut self) {
        for (_, m) in self.entries.drain() {
            m.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig() -> MaterialSignature {
        MaterialSignature {
            color: Color::from_rgb8(0x34, 0x98, 0xdb),
            roughness: 0.2,
            metalness: 0.9,
            clearcoat: 1.0,
            transmission: 0.0,
            env_map_intensity: 1.8,
            is_hole: false,
        }
    }

    #[test]
    fn identical_signatures_share_one_instance() {
        let mut cache = MaterialCache::new();
        let a = cache.get_or_create(&sig());
        let b = cache.get_or_create(&sig());
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn any_changed_field_gives_a_distinct_instance() {
        let mut cache = MaterialCache::new();
        let base = cache.get_or_create(&sig());
        let variants = [
            MaterialSignature { color: Color::WHITE, ..sig() },
            MaterialSignature { roughness: 0.3, ..sig() },
            MaterialSignature { metalness: 0.1, ..sig() },
            MaterialSignature { clearcoat: 0.5, ..sig() },
            MaterialSignature { transmission: 0.9, ..sig() },
            MaterialSignature { env_map_intensity: 0.2, ..sig() },
            MaterialSignature { is_hole: true, ..sig() },
        ];
        for v in &variants {
            assert!(!Rc::ptr_eq(&base, &cache.get_or_create(v)));
        }
        assert_eq!(cache.len(), 1 + variants.len());
    }

    #[test]
    fn creation_floors_and_biases() {
        let m = Material::new(&MaterialSignature {
            roughness: 0.0,
            clearcoat: 0.0,
            is_hole: true,
            ..sig()
        });
        assert_eq!((m.roughness, m.clearcoat, m.clearcoat_roughness), (0.05, 0.05, 0.05));
        assert_eq!(m.polygon_offset, -1.0);
        assert!(m.double_sided);
    }

    #[test]
    fn clearing_disposes_shared_materials() {
        let mut cache = MaterialCache::new();
        let held = cache.get_or_create(&sig());
        assert!(!held.is_disposed());
        cache.clear();
        assert!(held.is_disposed());
        assert!(cache.is_empty());
    }
}
