//! glTF 2.0 writer (`.gltf` with an embedded buffer, or binary `.glb`).
//!
//! One root node carries the solid's presentation TRS; each part is a
//! child node with its own mesh. Materials are PBR metallic-roughness,
//! shared between parts exactly as the scene shares them, with the
//! clearcoat and transmission extensions when those are non-zero.

use crate::error::ExportError;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::solid::{GeneratedSolid, presentation_rotation, presentation_scale};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::rc::Rc;

const FLOAT: u32 = 5126;
const ARRAY_BUFFER: u32 = 34962;
const TRIANGLES: u32 = 4;

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const EXT_CLEARCOAT: &str = "KHR_materials_clearcoat";
const EXT_TRANSMISSION: &str = "KHR_materials_transmission";

// ─── Document model ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Root {
    asset: Asset,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions_used: Vec<&'static str>,
    scene: usize,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<MeshDef>,
    materials: Vec<MaterialDef>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    buffers: Vec<Buffer>,
}

#[derive(Debug, Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Debug, Serialize)]
struct Scene {
    nodes: Vec<usize>,
}

#[derive(Debug, Default, Serialize)]
struct Node {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<[f32; 3]>,
}

#[derive(Debug, Serialize)]
struct MeshDef {
    primitives: Vec<Primitive>,
}

#[derive(Debug, Serialize)]
struct Primitive {
    attributes: Attributes,
    material: usize,
    mode: u32,
}

#[derive(Debug, Serialize)]
struct Attributes {
    #[serde(rename = "POSITION")]
    position: usize,
    #[serde(rename = "NORMAL")]
    normal: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDef {
    pbr_metallic_roughness: Pbr,
    double_sided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    alpha_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "MaterialExtensions::is_empty")]
    extensions: MaterialExtensions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Pbr {
    base_color_factor: [f32; 4],
    metallic_factor: f32,
    roughness_factor: f32,
}

#[derive(Debug, Default, Serialize)]
struct MaterialExtensions {
    #[serde(rename = "KHR_materials_clearcoat", skip_serializing_if = "Option::is_none")]
    clearcoat: Option<Clearcoat>,
    #[serde(rename = "KHR_materials_transmission", skip_serializing_if = "Option::is_none")]
    transmission: Option<Transmission>,
}

impl MaterialExtensions {
    fn is_empty(&self) -> bool {
        self.clearcoat.is_none() && self.transmission.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Clearcoat {
    clearcoat_factor: f32,
    clearcoat_roughness_factor: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Transmission {
    transmission_factor: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    min: [f32; 3],
    max: [f32; 3],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    target: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

// ─── Building ────────────────────────────────────────────────────────────

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

fn material_def(m: &Material) -> MaterialDef {
    let c = m.color;
    let mut extensions = MaterialExtensions::default();
    if m.clearcoat > 0.0 {
        extensions.clearcoat = Some(Clearcoat {
            clearcoat_factor: m.clearcoat,
            clearcoat_roughness_factor: m.clearcoat_roughness,
        });
    }
    if m.transmission > 0.0 {
        extensions.transmission = Some(Transmission {
            transmission_factor: m.transmission,
        });
    }
    MaterialDef {
        pbr_metallic_roughness: Pbr {
            base_color_factor: [srgb_to_linear(c.r), srgb_to_linear(c.g), srgb_to_linear(c.b), c.a],
            metallic_factor: m.metalness,
            roughness_factor: m.roughness,
        },
        double_sided: m.double_sided,
        alpha_mode: (c.a < 1.0).then_some("BLEND"),
        extensions,
    }
}

/// Append `mesh`'s positions and normals to `bin`, returning their
/// accessor indices.
fn push_mesh(mesh: &Mesh, bin: &mut Vec<u8>, views: &mut Vec<BufferView>, accessors: &mut Vec<Accessor>) -> Attributes {
    let bounds = mesh.bounds();
    let mut push = |data: &[glam::Vec3], min: [f32; 3], max: [f32; 3]| {
        let offset = bin.len();
        for v in data {
            for c in v.to_array() {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        views.push(BufferView {
            buffer: 0,
            byte_offset: offset,
            byte_length: bin.len() - offset,
            target: ARRAY_BUFFER,
        });
        accessors.push(Accessor {
            buffer_view: views.len() - 1,
            component_type: FLOAT,
            count: data.len(),
            kind: "VEC3",
            min,
            max,
        });
        accessors.len() - 1
    };
    let position = push(&mesh.positions, bounds.min.to_array(), bounds.max.to_array());
    let normal = push(&mesh.normals, [-1.0; 3], [1.0; 3]);
    Attributes { position, normal }
}

fn build(solid: &GeneratedSolid) -> (Root, Vec<u8>) {
    let mut bin = Vec::new();
    let mut views = Vec::new();
    let mut accessors = Vec::new();
    let mut meshes = Vec::new();
    let mut materials: Vec<MaterialDef> = Vec::new();
    let mut seen: Vec<*const Material> = Vec::new();
    let mut nodes = vec![Node {
        name: "solid".to_string(),
        rotation: Some(presentation_rotation().to_array()),
        scale: Some(presentation_scale(solid.geometry.scale).to_array()),
        ..Node::default()
    }];

    for (i, (part, material)) in solid.parts().enumerate() {
        let ptr = Rc::as_ptr(material);
        let material_index = match seen.iter().position(|p| *p == ptr) {
            Some(idx) => idx,
            None => {
                seen.push(ptr);
                materials.push(material_def(material));
                materials.len() - 1
            }
        };
        let attributes = push_mesh(&part.mesh, &mut bin, &mut views, &mut accessors);
        meshes.push(MeshDef {
            primitives: vec![Primitive {
                attributes,
                material: material_index,
                mode: TRIANGLES,
            }],
        });
        nodes.push(Node {
            name: format!("part-{i}"),
            mesh: Some(meshes.len() - 1),
            ..Node::default()
        });
        let child = nodes.len() - 1;
        nodes[0].children.push(child);
    }

    let mut extensions_used = Vec::new();
    if materials.iter().any(|m| m.extensions.clearcoat.is_some()) {
        extensions_used.push(EXT_CLEARCOAT);
    }
    if materials.iter().any(|m| m.extensions.transmission.is_some()) {
        extensions_used.push(EXT_TRANSMISSION);
    }

    let root = Root {
        asset: Asset {
            version: "2.0",
            generator: concat!("sc-solid ", env!("CARGO_PKG_VERSION")),
        },
        extensions_used,
        scene: 0,
        scenes: vec![Scene { nodes: vec![0] }],
        nodes,
        meshes,
        materials,
        accessors,
        buffer_views: views,
        buffers: vec![Buffer {
            byte_length: bin.len(),
            uri: None,
        }],
    };
    (root, bin)
}

/// JSON glTF with the binary buffer inlined as a base64 data URI.
pub fn encode_gltf(solid: &GeneratedSolid) -> Result<Vec<u8>, ExportError> {
    let (mut root, bin) = build(solid);
    root.buffers[0].uri = Some(format!("data:application/octet-stream;base64,{}", STANDARD.encode(&bin)));
    serde_json::to_vec_pretty(&root).map_err(|e| ExportError::Serialize(e.to_string()))
}

/// Binary glTF: 12-byte header, then a JSON and a BIN chunk, each padded
/// to four bytes.
pub fn encode_glb(solid: &GeneratedSolid) -> Result<Vec<u8>, ExportError> {
    let (root, mut bin) = build(solid);
    let mut json = serde_json::to_vec(&root).map_err(|e| ExportError::Serialize(e.to_string()))?;
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let total = u32::try_from(total).map_err(|_| ExportError::Serialize("model exceeds 4 GiB".to_string()))?;
    let mut out = Vec::with_capacity(total as usize);
    for word in [GLB_MAGIC, 2, total, json.len() as u32, CHUNK_JSON] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(&json);
    for word in [bin.len() as u32, CHUNK_BIN] {
        out.extend_from_slice(&word.to_le_bytes());
    }
    out.extend_from_slice(&bin);
    Ok(out)
}
