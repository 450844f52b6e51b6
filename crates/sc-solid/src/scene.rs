//! Scene Composer: the retained 3D scene around one solid.
//!
//! The composer owns the solid generator, lights, environment, bloom,
//! camera, and the spin group. [`SceneComposer::apply`] re-derives all of
//! it from a node's [`SolidParameters`]; [`SceneComposer::tick`] advances
//! auto-spin from the host's frame callback. Exporters get at the live
//! solid only through [`SceneComposer::handle`].

use crate::error::SolidError;
use crate::solid::{GeneratedSolid, SolidGenerator, SolidRequest};
use glam::{Mat4, Vec3};
use image::RgbaImage;
use sc_core::model::Color;
use sc_core::params::{EnvironmentImage, EnvironmentPreset, SolidParameters};
use std::f32::consts::{PI, TAU};

pub const CAMERA_DISTANCE: f32 = 150.0;
pub const CAMERA_FOV_DEGREES: f32 = 50.0;
pub const TONE_MAPPING_EXPOSURE: f32 = 1.2;

pub const BLOOM_INTENSITY_SCALE: f32 = 0.7;
pub const BLOOM_LUMINANCE_THRESHOLD: f32 = 0.4;
pub const BLOOM_RADIUS: f32 = 0.9;

// ─── Scene parts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_degrees: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            fov_degrees: CAMERA_FOV_DEGREES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentSource {
    Preset(EnvironmentPreset),
    /// Equirectangular image supplied by the user.
    Image(EnvironmentImage),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bloom {
    pub intensity: f32,
    pub luminance_threshold: f32,
    pub luminance_smoothing: f32,
    pub radius: f32,
    pub mipmap_blur: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    pub enabled: bool,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Where the scene is shown. Embedded in a canvas node, the canvas owns
/// pan and zoom, so orbit controls are off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Embedded,
    Standalone,
}

/// Borrowed view of the live solid, handed to exporters. Only exists
/// while a non-empty solid is loaded.
#[derive(Debug, Clone, Copy)]
pub struct SolidHandle<'a> {
    pub solid: &'a GeneratedSolid,
}

// ─── Composer ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SceneComposer {
    pub presentation: Presentation,
    pub camera: Camera,
    pub ambient: AmbientLight,
    pub key_light: DirectionalLight,
    pub environment: Option<EnvironmentSource>,
    pub bloom: Option<Bloom>,
    pub controls: OrbitControls,
    pub background: Color,
    pub exposure: f32,
    rotation: f32,
    spin: f32,
    spin_speed: Option<f32>,
    generator: SolidGenerator,
    solid: Option<GeneratedSolid>,
    frame: Option<RgbaImage>,
}

impl SceneComposer {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            presentation,
            camera: Camera::default(),
            ambient: AmbientLight { intensity: 0.6 * PI },
            key_light: DirectionalLight {
                position: Vec3::new(50.0, 50.0, 100.0),
                intensity: 0.8 * PI,
                cast_shadow: false,
            },
            environment: None,
            bloom: None,
            controls: OrbitControls {
                enabled: presentation == Presentation::Standalone,
                min_distance: 50.0,
                max_distance: 400.0,
            },
            background: Color::WHITE,
            exposure: TONE_MAPPING_EXPOSURE,
            rotation: 0.0,
            spin: 0.0,
            spin_speed: None,
            generator: SolidGenerator::new(),
            solid: None,
            frame: None,
        }
    }

    /// Re-derive the scene from `params`.
    ///
    /// Everything but the solid is applied unconditionally. A failed
    /// generation leaves the previous solid in place and is returned.
    pub fn apply(&mut self, params: &SolidParameters) -> Result<(), SolidError> {
        self.background = params.background;
        self.rotation = params.rotation;
        self.spin_speed = params.auto_spin.enabled.then_some(params.auto_spin.speed);
        self.environment = params.environment.enabled.then(|| match (&params.environment.preset, &params.environment.custom_image) {
            (EnvironmentPreset::Custom, Some(image)) => EnvironmentSource::Image(image.clone()),
            (EnvironmentPreset::Custom, None) => EnvironmentSource::Preset(EnvironmentPreset::default()),
            (preset, _) => EnvironmentSource::Preset(*preset),
        });
        self.bloom = params.bloom.enabled.then_some(Bloom {
            intensity: params.bloom.intensity * BLOOM_INTENSITY_SCALE,
            luminance_threshold: BLOOM_LUMINANCE_THRESHOLD,
            luminance_smoothing: params.bloom.smoothing,
            radius: BLOOM_RADIUS,
            mipmap_blur: params.bloom.mipmap_blur,
        });

        match params.outline.as_deref() {
            Some(outline) => {
                let solid = self.generator.generate(outline, &SolidRequest::from_params(params))?;
                self.solid = Some(solid);
            }
            None => {
                if self.solid.take().is_some() {
                    self.generator.dispose();
                }
            }
        }
        Ok(())
    }

    /// Advance auto-spin by `dt` seconds. Returns whether anything moved.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(speed) = self.spin_speed else {
            return false;
        };
        // One revolution per 60 / speed seconds.
        self.spin = (self.spin + TAU / 60.0 * speed * dt).rem_euclid(TAU);
        true
    }

    /// Rotation of the group holding the solid.
    pub fn group_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation + self.spin)
    }

    pub fn solid(&self) -> Option<&GeneratedSolid> {
        self.solid.as_ref()
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin
    }

    /// Record the frame the host last presented; raster export copies it.
    pub fn present_frame(&mut self, frame: RgbaImage) {
        self.frame = Some(frame);
    }

    pub fn handle(&self) -> Option<SolidHandle<'_>> {
        let solid = self.solid.as_ref().filter(|s| !s.is_empty())?;
        Some(SolidHandle { solid })
    }

    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    /// Release the solid, its geometry, and every cached material.
    pub fn dispose(&mut self) {
        self.solid = None;
        self.frame = None;
        self.generator.dispose();
    }
}
