//! Per-solid 3D parameters and their presets.
//!
//! Each solid node owns one [`SolidParameters`] record, created lazily with
//! defaults by [`ParamStore::get_or_default`] and dropped with the node.

use crate::id::NodeId;
use crate::model::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─── Presets ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialPreset {
    #[default]
    Metallic,
    Clay,
    Plastic,
    Glass,
    Custom,
}

impl MaterialPreset {
    pub const ALL: [MaterialPreset; 5] = [
        MaterialPreset::Metallic,
        MaterialPreset::Clay,
        MaterialPreset::Plastic,
        MaterialPreset::Glass,
        MaterialPreset::Custom,
    ];

    /// `(roughness, metalness, clearcoat, transmission, env_map_intensity)`
    pub fn values(self) -> (f32, f32, f32, f32, f32) {
        match self {
            MaterialPreset::Metallic => (0.2, 0.9, 1.0, 0.0, 1.8),
            MaterialPreset::Clay => (1.0, 0.0, 0.0, 0.0, 0.3),
            MaterialPreset::Plastic => (0.4, 0.0, 0.6, 0.0, 0.8),
            MaterialPreset::Glass => (0.05, 0.0, 1.0, 0.95, 3.5),
            MaterialPreset::Custom => (0.3, 0.5, 0.0, 0.0, 1.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MaterialPreset::Metallic => "Metallic",
            MaterialPreset::Clay => "Clay/Matte",
            MaterialPreset::Plastic => "Plastic",
            MaterialPreset::Glass => "Glass",
            MaterialPreset::Custom => "Custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BevelPreset {
    None,
    Light,
    #[default]
    Medium,
    Heavy,
    Custom,
}

impl BevelPreset {
    /// `(thickness, size, segments)`
    pub fn values(self) -> (f32, f32, u32) {
        match self {
            BevelPreset::None => (0.0, 0.0, 1),
            BevelPreset::Light => (0.5, 0.3, 2),
            BevelPreset::Medium => (1.0, 0.5, 4),
            BevelPreset::Heavy => (2.0, 1.0, 8),
            BevelPreset::Custom => (1.0, 0.5, 4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentPreset {
    #[default]
    Apartment,
    City,
    Dawn,
    Forest,
    Lobby,
    Park,
    Studio,
    Sunset,
    Warehouse,
    /// User-supplied equirectangular image.
    Custom,
}

impl EnvironmentPreset {
    pub const NAMED: [EnvironmentPreset; 9] = [
        EnvironmentPreset::Apartment,
        EnvironmentPreset::City,
        EnvironmentPreset::Dawn,
        EnvironmentPreset::Forest,
        EnvironmentPreset::Lobby,
        EnvironmentPreset::Park,
        EnvironmentPreset::Studio,
        EnvironmentPreset::Sunset,
        EnvironmentPreset::Warehouse,
    ];

    /// Representative tint of the preset's lighting. `None` for `Custom`.
    pub fn tint(self) -> Option<Color> {
        let hex = match self {
            EnvironmentPreset::Apartment => "#e0ccae",
            EnvironmentPreset::City => "#b4bdc6",
            EnvironmentPreset::Dawn => "#ffd0b0",
            EnvironmentPreset::Forest => "#a8c0a0",
            EnvironmentPreset::Lobby => "#d8c8b8",
            EnvironmentPreset::Park => "#b3d9ff",
            EnvironmentPreset::Studio => "#d9d9d9",
            EnvironmentPreset::Sunset => "#ffb98c",
            EnvironmentPreset::Warehouse => "#9ba3ad",
            EnvironmentPreset::Custom => return None,
        };
        Color::from_hex(hex)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnvironmentPreset::Apartment => "apartment",
            EnvironmentPreset::City => "city",
            EnvironmentPreset::Dawn => "dawn",
            EnvironmentPreset::Forest => "forest",
            EnvironmentPreset::Lobby => "lobby",
            EnvironmentPreset::Park => "park",
            EnvironmentPreset::Studio => "studio",
            EnvironmentPreset::Sunset => "sunset",
            EnvironmentPreset::Warehouse => "warehouse",
            EnvironmentPreset::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPreset {
    Light,
    Dark,
    Blue,
    Gray,
    Green,
}

impl BackgroundPreset {
    pub fn color(self) -> Color {
        let [r, g, b] = match self {
            BackgroundPreset::Light => [0xf5, 0xf5, 0xf5],
            BackgroundPreset::Dark => [0x12, 0x12, 0x12],
            BackgroundPreset::Blue => [0xe6, 0xf7, 0xff],
            BackgroundPreset::Gray => [0xe0, 0xe0, 0xe0],
            BackgroundPreset::Green => [0xe6, 0xff, 0xed],
        };
        Color::from_rgb8(r, g, b)
    }
}

// ─── Parameter records ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BevelParams {
    pub enabled: bool,
    pub thickness: f32,
    pub size: f32,
    pub segments: u32,
    pub preset: BevelPreset,
}

impl Default for BevelParams {
    fn default() -> Self {
        let preset = BevelPreset::Medium;
        let (thickness, size, segments) = preset.values();
        Self {
            enabled: true,
            thickness,
            size,
            segments,
            preset,
        }
    }
}

impl BevelParams {
    /// Switch preset. `None` also disables the bevel.
    pub fn apply_preset(&mut self, preset: BevelPreset) {
        let (thickness, size, segments) = preset.values();
        self.preset = preset;
        self.thickness = thickness;
        self.size = size;
        self.segments = segments;
        self.enabled = preset != BevelPreset::None;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub preset: MaterialPreset,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub transmission: f32,
    pub env_map_intensity: f32,
    /// Replaces every outline's own fill color when set.
    pub override_color: Option<Color>,
}

impl Default for MaterialParams {
    fn default() -> Self {
        let mut params = Self {
            preset: MaterialPreset::Metallic,
            roughness: 0.0,
            metalness: 0.0,
            clearcoat: 0.0,
            transmission: 0.0,
            env_map_intensity: 0.0,
            override_color: None,
        };
        params.apply_preset(MaterialPreset::Metallic);
        params
    }
}

impl MaterialParams {
    pub fn apply_preset(&mut self, preset: MaterialPreset) {
        let (roughness, metalness, clearcoat, transmission, env) = preset.values();
        self.preset = preset;
        self.roughness = roughness;
        self.metalness = metalness;
        self.clearcoat = clearcoat;
        self.transmission = transmission;
        self.env_map_intensity = env;
    }
}

/// A user-uploaded environment image, already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentImage {
    pub mime: String,
    /// `data:{mime};base64,...`
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentParams {
    pub enabled: bool,
    pub preset: EnvironmentPreset,
    pub custom_image: Option<EnvironmentImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoSpin {
    pub enabled: bool,
    pub speed: f32,
}

impl Default for AutoSpin {
    fn default() -> Self {
        Self {
            enabled: false,
            speed: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloomParams {
    pub enabled: bool,
    pub intensity: f32,
    pub smoothing: f32,
    pub mipmap_blur: bool,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            enabled: false,
            intensity: 1.0,
            smoothing: 0.95,
            mipmap_blur: true,
        }
    }
}

/// All 3D state of one solid node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidParameters {
    /// Sanitised vector markup, `None` until a file has been loaded.
    pub outline: Option<String>,
    pub file_name: String,
    pub loading: bool,
    /// Last intake error, shown on the node until the next load.
    pub error: Option<String>,

    pub depth: f32,
    pub bevel: BevelParams,
    pub material: MaterialParams,
    pub environment: EnvironmentParams,
    pub background: Color,
    pub background_preset: Option<BackgroundPreset>,
    /// Manual rotation about the vertical axis, radians.
    pub rotation: f32,
    pub auto_spin: AutoSpin,
    pub bloom: BloomParams,
}

impl Default for SolidParameters {
    fn default() -> Self {
        Self {
            outline: None,
            file_name: String::new(),
            loading: false,
            error: None,
            depth: 1.0,
            bevel: BevelParams::default(),
            material: MaterialParams::default(),
            environment: EnvironmentParams {
                enabled: true,
                ..EnvironmentParams::default()
            },
            background: BackgroundPreset::Light.color(),
            background_preset: Some(BackgroundPreset::Light),
            rotation: 0.0,
            auto_spin: AutoSpin::default(),
            bloom: BloomParams::default(),
        }
    }
}

impl SolidParameters {
    /// Toggle the bloom ("magic light") effect.
    ///
    /// Turning it on also forces a black background, stops auto-spin, and
    /// blackens an active override color. Turning it off touches nothing
    /// else.
    pub fn set_bloom(&mut self, enabled: bool) {
        self.bloom.enabled = enabled;
        if enabled {
            self.background = Color::BLACK;
            self.background_preset = None;
            self.auto_spin.enabled = false;
            if self.material.override_color.is_some() {
                self.material.override_color = Some(Color::BLACK);
            }
        }
    }

    pub fn set_background_preset(&mut self, preset: BackgroundPreset) {
        self.background = preset.color();
        self.background_preset = Some(preset);
    }

    /// Install a validated custom environment image.
    pub fn set_environment_image(&mut self, image: EnvironmentImage) {
        self.environment.custom_image = Some(image);
        self.environment.preset = EnvironmentPreset::Custom;
        self.environment.enabled = true;
    }

    /// Strength used for material reflections: the material's own value
    /// with environment lighting on, a dim constant without it.
    pub fn effective_env_intensity(&self) -> f32 {
        if self.environment.enabled {
            self.material.env_map_intensity
        } else {
            0.2
        }
    }
}

// ─── Store ───────────────────────────────────────────────────────────────

/// Owner of every solid node's parameters.
///
/// Writes are queued as "changed" ids; the scene registry drains them with
/// [`ParamStore::take_changed`] and re-applies only those solids.
#[derive(Debug, Default)]
pub struct ParamStore {
    entries: HashMap<NodeId, SolidParameters>,
    changed: Vec<NodeId>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&SolidParameters> {
        self.entries.get(&id)
    }

    pub fn get_or_default(&mut self, id: NodeId) -> &SolidParameters {
        self.entries.entry(id).or_default()
    }

    /// Mutate the parameters of `id` (creating defaults first if needed)
    /// and mark it changed.
    pub fn update<R>(&mut self, id: NodeId, f: impl FnOnce(&mut SolidParameters) -> R) -> R {
        let params = self.entries.entry(id).or_default();
        let out = f(params);
        if !self.changed.contains(&id) {
            self.changed.push(id);
        }
        out
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SolidParameters> {
        self.changed.retain(|c| *c != id);
        self.entries.remove(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.changed.clear();
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.keys().copied()
    }

    /// Drain ids written since the last call, in first-write order.
    pub fn take_changed(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_follow_medium_bevel_and_metallic() {
        let p = SolidParameters::default();
        assert_eq!(p.depth, 1.0);
        assert!(p.bevel.enabled);
        assert_eq!((p.bevel.thickness, p.bevel.size, p.bevel.segments), (1.0, 0.5, 4));
        assert_eq!(p.material.roughness, 0.2);
        assert_eq!(p.material.env_map_intensity, 1.8);
        assert_eq!(p.background.to_hex(), "#f5f5f5");
        assert!(p.environment.enabled);
    }

    #[test]
    fn bloom_forces_black_background_and_stops_spin() {
        let mut p = SolidParameters::default();
        p.auto_spin.enabled = true;
        p.material.override_color = Color::from_hex("#3498db");
        p.set_bloom(true);
        assert_eq!(p.background, Color::BLACK);
        assert!(!p.auto_spin.enabled);
        assert_eq!(p.material.override_color, Some(Color::BLACK));

        p.set_background_preset(BackgroundPreset::Blue);
        p.set_bloom(false);
        assert_eq!(p.background.to_hex(), "#e6f7ff");
    }

    #[test]
    fn bloom_leaves_fill_colors_alone_without_override() {
        let mut p = SolidParameters::default();
        p.set_bloom(true);
        assert_eq!(p.material.override_color, None);
    }

    #[test]
    fn bevel_none_preset_disables() {
        let mut b = BevelParams::default();
        b.apply_preset(BevelPreset::None);
        assert!(!b.enabled);
        b.apply_preset(BevelPreset::Heavy);
        assert!(b.enabled);
        assert_eq!(b.segments, 8);
    }

    #[test]
    fn env_intensity_dims_without_environment() {
        let mut p = SolidParameters::default();
        assert_eq!(p.effective_env_intensity(), 1.8);
        p.environment.enabled = false;
        assert_eq!(p.effective_env_intensity(), 0.2);
    }

    #[test]
    fn store_creates_lazily_and_tracks_changes() {
        let mut store = ParamStore::new();
        let id = NodeId::intern("params_store");
        assert!(store.get(id).is_none());
        assert_eq!(store.get_or_default(id).depth, 1.0);
        assert!(store.take_changed().is_empty());

        store.update(id, |p| p.depth = 3.0);
        store.update(id, |p| p.rotation = 0.5);
        assert_eq!(store.take_changed(), vec![id]);
        assert_eq!(store.get(id).unwrap().depth, 3.0);

        store.remove(id);
        assert!(!store.contains(id));
    }
}
