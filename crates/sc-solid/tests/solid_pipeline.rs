//! Integration tests: outline markup through to a composed scene.

use pretty_assertions::assert_eq;
use sc_core::id::NodeId;
use sc_core::params::{ParamStore, SolidParameters};
use sc_solid::{FileUpload, Presentation, SceneComposer, SolidError, SolidGenerator, SolidRequest};
use std::rc::Rc;

const SQUARE: &str = include_str!("fixtures/square.svg");
const RING: &str = include_str!("fixtures/ring.svg");
const BADGE: &str = include_str!("fixtures/badge.svg");

fn flat(depth: f32) -> SolidRequest {
    let mut params = SolidParameters {
        depth,
        ..SolidParameters::default()
    };
    params.bevel.enabled = false;
    SolidRequest::from_params(&params)
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[test]
fn square_is_centred_on_the_origin() {
    let mut generator = SolidGenerator::new();
    let solid = generator
        .generate(SQUARE, &SolidRequest::from_params(&SolidParameters::default()))
        .unwrap();
    let b = solid.bounds();
    let c = b.center();
    assert!(c.x.abs() < 1e-3, "x centre {}", c.x);
    assert!(c.y.abs() < 1e-3, "y centre {}", c.y);
    assert!(c.z.abs() < 1e-3, "z centre {}", c.z);
}

#[test]
fn flat_square_volume() {
    let mut generator = SolidGenerator::new();
    let solid = generator.generate(SQUARE, &flat(1.0)).unwrap();
    assert_eq!(solid.geometry.parts.len(), 1);
    let volume = solid.geometry.parts[0].mesh.signed_volume();
    // 100 × 100 outline, depth 1 scaled to 5.
    assert!((volume - 50_000.0).abs() < 1.0, "volume {volume}");
}

#[test]
fn ring_hole_is_cut_out() {
    let mut generator = SolidGenerator::new();
    let solid = generator.generate(RING, &flat(1.0)).unwrap();
    assert_eq!(solid.geometry.parts.len(), 1);
    let volume = solid.geometry.parts[0].mesh.signed_volume();
    assert!((volume - 37_500.0).abs() < 1.0, "volume {volume}");
}

#[test]
fn fill_rule_decides_nested_subpaths() {
    // Both subpaths wind the same way.
    let nested = |rule: &str| {
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100"><path d="M0 0H100V100H0Z M25 25H75V75H25Z" fill-rule="{rule}"/></svg>"##
        )
    };
    let mut generator = SolidGenerator::new();
    let filled = generator.generate(&nested("nonzero"), &flat(1.0)).unwrap();
    let volume = filled.geometry.parts[0].mesh.signed_volume();
    assert!((volume - 50_000.0).abs() < 1.0, "volume {volume}");

    let cut = generator.generate(&nested("evenodd"), &flat(1.0)).unwrap();
    let volume = cut.geometry.parts[0].mesh.signed_volume();
    assert!((volume - 37_500.0).abs() < 1.0, "volume {volume}");
}

#[test]
fn badge_parts_share_materials_by_color() {
    let mut generator = SolidGenerator::new();
    let solid = generator
        .generate(BADGE, &SolidRequest::from_params(&SolidParameters::default()))
        .unwrap();

    // Stroke-only path contributes nothing.
    assert_eq!(solid.geometry.parts.len(), 3);
    assert_eq!(generator.material_count(), 2);
    assert!(Rc::ptr_eq(&solid.materials[0], &solid.materials[1]));
    assert!(!Rc::ptr_eq(&solid.materials[0], &solid.materials[2]));
    assert_eq!(solid.geometry.scale, 0.5);
}

#[test]
fn override_color_collapses_materials() {
    let mut generator = SolidGenerator::new();
    let mut params = SolidParameters::default();
    params.material.override_color = Some(sc_core::model::Color::WHITE);
    let solid = generator.generate(BADGE, &SolidRequest::from_params(&params)).unwrap();
    assert_eq!(generator.material_count(), 1);
    assert!(solid.materials.iter().all(|m| Rc::ptr_eq(m, &solid.materials[0])));
}

#[test]
fn new_outline_releases_old_resources() {
    let mut generator = SolidGenerator::new();
    let req = SolidRequest::from_params(&SolidParameters::default());
    let square = generator.generate(SQUARE, &req).unwrap();
    let ring = generator.generate(RING, &req).unwrap();
    assert!(square.geometry.is_disposed());
    assert!(square.materials[0].is_disposed());
    assert!(!ring.materials[0].is_disposed());
}

// ─── Scene ───────────────────────────────────────────────────────────────

#[test]
fn loaded_outline_reaches_the_scene() {
    let mut store = ParamStore::new();
    let id = NodeId::intern("pipeline_scene");
    sc_solid::begin_outline_load(&mut store, id);
    sc_solid::finish_outline_load(
        &mut store,
        id,
        &FileUpload {
            name: "badge.svg",
            mime: "image/svg+xml",
            bytes: BADGE.as_bytes(),
        },
    )
    .unwrap();

    let params = store.get(id).unwrap();
    assert!(!params.loading);
    assert!(!params.outline.as_deref().unwrap().contains("&trade;"));

    let mut scene = SceneComposer::new(Presentation::Embedded);
    scene.apply(params).unwrap();
    assert!(scene.handle().is_some());
    assert!(!scene.controls.enabled);
}

#[test]
fn rejected_outline_keeps_the_previous_one() {
    let mut store = ParamStore::new();
    let id = NodeId::intern("pipeline_reject");
    let square = FileUpload {
        name: "square.svg",
        mime: "image/svg+xml",
        bytes: SQUARE.as_bytes(),
    };
    sc_solid::finish_outline_load(&mut store, id, &square).unwrap();

    let broken = FileUpload {
        name: "broken.svg",
        mime: "image/svg+xml",
        bytes: b"<html></html>",
    };
    let err = sc_solid::finish_outline_load(&mut store, id, &broken).unwrap_err();
    assert!(matches!(err, SolidError::Parse(_)));

    let params = store.get(id).unwrap();
    assert_eq!(params.file_name, "square.svg");
    assert_eq!(params.error.as_deref(), Some("Invalid SVG: No SVG element found"));
}

#[test]
fn gif_environment_is_rejected_without_changes() {
    let mut store = ParamStore::new();
    let id = NodeId::intern("pipeline_env");
    let before = store.get_or_default(id).clone();

    let gif = FileUpload {
        name: "sky.gif",
        mime: "image/gif",
        bytes: b"GIF89a\x01\0\x01\0",
    };
    let err = sc_solid::upload_environment(&mut store, id, &gif).unwrap_err();
    assert!(matches!(err, SolidError::UnsupportedFileType(_)));
    assert_eq!(store.get(id), Some(&before));
}
