//! glTF 2.0 loader (`.gltf` with external or embedded buffers, and `.glb`).
//!
//! Produces a [`Prefab`]: node hierarchy with names and TRS, triangle meshes,
//! base-color materials and translation / rotation / scale clips. Textures,
//! skins and morph targets are not read.
//!
//! A node whose mesh has a single primitive carries that primitive directly.
//! A node whose mesh has several primitives becomes a group with one child
//! per primitive, named `<node>_<index>`.

use std::sync::Arc;

use base64::Engine as _;
use glam::{Quat, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::io::AssetReaderVariant;
use crate::assets::prefab::{Prefab, PrefabNode};
use crate::errors::{Result, ViewerError};
use crate::resources::{Material, Mesh};
use crate::scene::transform::Transform;

pub struct GltfLoader;

impl GltfLoader {
    /// Reads `source` (path or URL) plus any external buffers, then parses
    /// the document on the blocking pool.
    pub async fn load_async(source: &str) -> Result<Prefab> {
        let reader = AssetReaderVariant::from_source(source)?;
        let file_name = AssetReaderVariant::source_filename(source).to_string();

        let bytes = reader.read_bytes(&file_name).await?;
        let gltf = gltf::Gltf::from_slice_without_validation(&bytes)?;

        let mut buffers = Vec::with_capacity(gltf.buffers().len());
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:") => {
                    reader.read_bytes(uri).await?
                }
                _ => Self::embedded_buffer(&gltf, &buffer)?,
            };
            buffers.push(data);
        }

        tokio::task::spawn_blocking(move || Self::build_prefab(&gltf, &buffers)).await?
    }

    /// Parses a self-contained document: a `.glb` or a `.gltf` whose buffers
    /// are all data URIs.
    pub fn load_from_slice(bytes: &[u8]) -> Result<Prefab> {
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
        let buffers = gltf
            .buffers()
            .map(|buffer| Self::embedded_buffer(&gltf, &buffer))
            .collect::<Result<Vec<_>>>()?;
        Self::build_prefab(&gltf, &buffers)
    }

    fn embedded_buffer(gltf: &gltf::Gltf, buffer: &gltf::Buffer) -> Result<Vec<u8>> {
        match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| ViewerError::GltfError("Missing GLB binary chunk".into())),
            gltf::buffer::Source::Uri(uri) => decode_data_uri(uri),
        }
    }

    fn build_prefab(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Result<Prefab> {
        let scene = gltf.default_scene().or_else(|| gltf.scenes().next());
        let name = scene
            .as_ref()
            .and_then(|s| s.name())
            .unwrap_or("Scene")
            .to_string();

        let mut prefab = Prefab::new(name);
        prefab.materials = load_materials(gltf);
        let material_count = prefab.materials.len();

        // gltf node i ↔ prefab node i; per-primitive children are appended after.
        for node in gltf.nodes() {
            let (t, r, s) = node.transform().decomposed();
            let mut prefab_node = PrefabNode::new(node_name(&node));
            prefab_node.transform =
                Transform::from_trs(Vec3::from_array(t), Quat::from_array(r), Vec3::from_array(s));
            prefab.add_node(prefab_node);
        }

        for node in gltf.nodes() {
            if let Some(mesh) = node.mesh() {
                attach_mesh(&mut prefab, node.index(), &mesh, material_count, buffers);
            }
            let children: Vec<usize> = node.children().map(|c| c.index()).collect();
            prefab.nodes[node.index()].children_indices.extend(children);
        }

        prefab.root_indices = match scene {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => orphan_nodes(gltf),
        };

        prefab.animations = load_animations(gltf, buffers);

        log::info!(
            "Parsed glTF: {} nodes, {} meshes, {} materials, {} clips",
            prefab.nodes.len(),
            prefab.meshes.len(),
            prefab.materials.len(),
            prefab.animations.len()
        );
        Ok(prefab)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

/// Nodes that are nobody's child, used when the file declares no scene.
fn orphan_nodes(gltf: &gltf::Gltf) -> Vec<usize> {
    let mut is_child = vec![false; gltf.nodes().len()];
    for node in gltf.nodes() {
        for child in node.children() {
            is_child[child.index()] = true;
        }
    }
    (0..is_child.len()).filter(|&i| !is_child[i]).collect()
}

/// `data:[<mediatype>];base64,<payload>`
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ViewerError::DataUriError(format!("Not a data URI: {uri:.32}")))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ViewerError::DataUriError("Missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(ViewerError::DataUriError(format!(
            "Unsupported data URI encoding: {header}"
        )));
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

// ============================================================================
// Materials & Meshes
// ============================================================================

fn load_materials(gltf: &gltf::Gltf) -> Vec<Material> {
    gltf.materials()
        .enumerate()
        .map(|(i, m)| {
            let name = m.name().map_or_else(|| format!("Material_{i}"), str::to_string);
            // glTF base color factors are already linear.
            let mut material = Material::new(name, Vec4::from_array(m.pbr_metallic_roughness().base_color_factor()));
            material.double_sided = m.double_sided();
            material
        })
        .collect()
}

fn default_material_index(prefab: &mut Prefab, default_material: &mut Option<usize>) -> usize {
    *default_material.get_or_insert_with(|| {
        prefab.materials.push(Material::default());
        prefab.materials.len() - 1
    })
}

/// Puts the primitives of `mesh` on node `node_index`. `material_count` is the
/// number of materials declared by the file.
fn attach_mesh(
    prefab: &mut Prefab,
    node_index: usize,
    mesh: &gltf::Mesh,
    material_count: usize,
    buffers: &[Vec<u8>],
) {
    let node_label = prefab.nodes[node_index].name.clone();
    let mesh_label = mesh.name().map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);
    let primitives: Vec<gltf::Primitive> = mesh.primitives().collect();
    let split = primitives.len() > 1;

    let mut default_material = None;

    for (p, primitive) in primitives.iter().enumerate() {
        let Some(geometry) = load_primitive(primitive, buffers, format!("{mesh_label}_{p}")) else {
            continue;
        };
        prefab.meshes.push(geometry);
        let mesh_index = prefab.meshes.len() - 1;

        let material_index = match primitive.material().index() {
            Some(i) if i < material_count => i,
            _ => default_material_index(prefab, &mut default_material),
        };

        if split {
            let mut child = PrefabNode::new(format!("{node_label}_{p}"));
            child.mesh = Some(mesh_index);
            child.material = Some(material_index);
            let child_index = prefab.add_node(child);
            prefab.nodes[node_index].children_indices.push(child_index);
        } else {
            let node = &mut prefab.nodes[node_index];
            node.mesh = Some(mesh_index);
            node.material = Some(material_index);
        }
    }
}

fn load_primitive(primitive: &gltf::Primitive, buffers: &[Vec<u8>], name: String) -> Option<Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!("Skipping primitive '{name}': mode {:?} is not a triangle list", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let Some(positions) = reader.read_positions() else {
        log::warn!("Skipping primitive '{name}': no POSITION attribute");
        return None;
    };
    let positions: Vec<Vec3> = positions.map(Vec3::from_array).collect();
    let normals = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from_array).collect());
    let indices = reader.read_indices().map(|i| i.into_u32().collect());

    Some(Mesh::new(name, positions, normals, indices))
}

// ============================================================================
// Animations
// ============================================================================

fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<Arc<AnimationClip>> {
    gltf.animations()
        .map(|anim| {
            let tracks = anim
                .channels()
                .filter_map(|channel| load_track(&channel, buffers))
                .collect();
            let name = anim.name().map_or_else(|| format!("anim_{}", anim.index()), str::to_string);
            Arc::new(AnimationClip::new(name, tracks))
        })
        .collect()
}

fn load_track(channel: &gltf::animation::Channel, buffers: &[Vec<u8>]) -> Option<Track> {
    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let target = channel.target();
    let node_name = node_name(&target.node());

    let times: Vec<f32> = reader.read_inputs()?.collect();

    let interpolation = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
        gltf::animation::Interpolation::Step => InterpolationMode::Step,
        gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
    };

    let (target, data) = match reader.read_outputs()? {
        ReadOutputs::Translations(iter) => (
            TargetPath::Translation,
            TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
        ),
        ReadOutputs::Rotations(iter) => (
            TargetPath::Rotation,
            TrackData::Quaternion(KeyframeTrack::new(
                times,
                iter.into_f32().map(Quat::from_array).collect(),
                interpolation,
            )),
        ),
        ReadOutputs::Scales(iter) => (
            TargetPath::Scale,
            TrackData::Vector3(KeyframeTrack::new(times, iter.map(Vec3::from_array).collect(), interpolation)),
        ),
        ReadOutputs::MorphTargetWeights(_) => return None,
    };

    let empty = match &data {
        TrackData::Vector3(t) => t.is_empty(),
        TrackData::Quaternion(t) => t.is_empty(),
    };
    if empty {
        log::warn!("Skipping empty animation channel for '{node_name}'");
        return None;
    }

    Some(Track {
        meta: TrackMeta { node_name, target },
        data,
    })
}
