//! Asset Loading Tests
//!
//! Tests for:
//! - decode_data_uri: base64 payloads and malformed URIs
//! - GltfLoader: nodes, multi-primitive split, materials, animation clips
//! - load_blocking: files on disk, external buffers, missing files
//! - ModelLoad: background load polled to completion
//! - Viewer continuation on a loaded glTF model

#![cfg(feature = "gltf")]

use std::path::PathBuf;
use std::time::{Duration, Instant};

use base64::Engine;
use glam::{Vec3, Vec4};
use part_viewer::animation::{InterpolationMode, TargetPath, TrackData};
use part_viewer::assets::{GltfLoader, LoadState, ModelLoad, Prefab, load_blocking};
use part_viewer::assets::loaders::decode_data_uri;
use part_viewer::config::ViewerConfig;
use part_viewer::errors::ViewerError;
use part_viewer::metadata::MetadataTable;
use part_viewer::viewer::{AssetState, Viewer};
use serde_json::json;

const EPSILON: f32 = 1e-4;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Fixture
// ============================================================================

/// Binary payload: triangle positions, u16 indices, two keyframe times and
/// two translations.
fn buffer_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    for v in [[-0.5_f32, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]] {
        for c in v {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0_u16, 1, 2] {
        bytes.extend_from_slice(&i.to_le_bytes());
    }
    bytes.extend_from_slice(&[0, 0]); // pad to 4
    for t in [0.0_f32, 1.0] {
        bytes.extend_from_slice(&t.to_le_bytes());
    }
    for v in [[0.0_f32, 0.0, 0.0], [0.0, 0.0, 0.5]] {
        for c in v {
            bytes.extend_from_slice(&c.to_le_bytes());
        }
    }
    assert_eq!(bytes.len(), 76);
    bytes
}

fn data_uri(bytes: &[u8]) -> String {
    format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// A cabinet with a drawer, a single-primitive wing and a two-primitive
/// hinge, plus a named and an unnamed clip.
fn document(buffer_uri: &str) -> String {
    json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "name": "Cabinet", "nodes": [0] }],
        "nodes": [
            { "name": "Body", "children": [1, 2, 3], "translation": [0.0, 1.0, 0.0] },
            { "name": "DrawerLeft_mesh_003", "mesh": 0 },
            { "name": "LeftWing", "mesh": 0 },
            { "name": "Hinge", "mesh": 1 }
        ],
        "materials": [{
            "name": "Oak",
            "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.25, 0.125, 1.0] },
            "doubleSided": true
        }],
        "meshes": [
            { "name": "Panel", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] },
            { "name": "HingeMesh", "primitives": [
                { "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 },
                { "attributes": { "POSITION": 0 } }
            ]}
        ],
        "animations": [
            {
                "name": "LeftDrawerOpen",
                "channels": [{ "sampler": 0, "target": { "node": 1, "path": "translation" } }],
                "samplers": [{ "input": 2, "output": 3, "interpolation": "LINEAR" }]
            },
            {
                "channels": [{ "sampler": 0, "target": { "node": 2, "path": "translation" } }],
                "samplers": [{ "input": 2, "output": 3, "interpolation": "STEP" }]
            }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [-0.5, -0.5, 0.0], "max": [0.5, 0.5, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 24 }
        ],
        "buffers": [{ "byteLength": 76, "uri": buffer_uri }]
    })
    .to_string()
}

fn embedded_document() -> String {
    document(&data_uri(&buffer_bytes()))
}

fn load_fixture() -> Prefab {
    GltfLoader::load_from_slice(embedded_document().as_bytes()).expect("fixture parses")
}

fn node_index(prefab: &Prefab, name: &str) -> usize {
    prefab
        .nodes
        .iter()
        .position(|n| n.name == name)
        .unwrap_or_else(|| panic!("no node named {name}"))
}

/// Fresh per-test directory under the system temp dir.
fn temp_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("part-viewer-{}-{test}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

// ============================================================================
// Data URIs
// ============================================================================

#[test]
fn data_uri_decodes_base64_payload() {
    let bytes = decode_data_uri("data:application/octet-stream;base64,AAEC/w==").unwrap();
    assert_eq!(bytes, vec![0, 1, 2, 255]);
}

#[test]
fn data_uri_rejects_malformed_input() {
    assert!(matches!(
        decode_data_uri("model.bin"),
        Err(ViewerError::DataUriError(_))
    ));
    assert!(matches!(
        decode_data_uri("data:application/octet-stream;base64"),
        Err(ViewerError::DataUriError(_))
    ));
    assert!(matches!(
        decode_data_uri("data:text/plain,hello"),
        Err(ViewerError::DataUriError(_))
    ));
    assert!(decode_data_uri("data:application/octet-stream;base64,@@@").is_err());
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn gltf_nodes_keep_names_and_hierarchy() {
    let prefab = load_fixture();

    assert_eq!(prefab.name, "Cabinet");
    assert_eq!(prefab.root_indices, vec![0]);
    assert_eq!(prefab.nodes[0].name, "Body");
    assert_eq!(prefab.nodes[0].children_indices, vec![1, 2, 3]);
    assert!(vec3_approx(prefab.nodes[0].transform.position, Vec3::Y));
}

#[test]
fn single_primitive_mesh_stays_on_node() {
    let prefab = load_fixture();
    let drawer = &prefab.nodes[node_index(&prefab, "DrawerLeft_mesh_003")];

    let mesh = &prefab.meshes[drawer.mesh.unwrap()];
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert_eq!(mesh.normals.len(), 3);

    let material = &prefab.materials[drawer.material.unwrap()];
    assert_eq!(material.name, "Oak");
    assert_eq!(material.color, Vec4::new(0.5, 0.25, 0.125, 1.0));
    assert!(material.double_sided);
}

#[test]
fn multi_primitive_mesh_splits_into_children() {
    let prefab = load_fixture();
    let hinge_index = node_index(&prefab, "Hinge");
    let hinge = &prefab.nodes[hinge_index];

    assert!(hinge.mesh.is_none());
    let names: Vec<&str> = hinge
        .children_indices
        .iter()
        .map(|&i| prefab.nodes[i].name.as_str())
        .collect();
    assert_eq!(names, vec!["Hinge_0", "Hinge_1"]);

    // The primitive without a material gets the default one.
    let second = &prefab.nodes[node_index(&prefab, "Hinge_1")];
    assert_eq!(prefab.materials[second.material.unwrap()].name, "Default");
    // Non-indexed primitives get sequential indices.
    assert_eq!(prefab.meshes[second.mesh.unwrap()].indices, vec![0, 1, 2]);
}

#[test]
fn animations_become_named_clips() {
    let prefab = load_fixture();
    assert_eq!(prefab.animations.len(), 2);

    let open = &prefab.animations[0];
    assert_eq!(open.name, "LeftDrawerOpen");
    assert!((open.duration - 1.0).abs() < EPSILON);
    assert_eq!(open.tracks.len(), 1);
    assert_eq!(open.tracks[0].meta.node_name, "DrawerLeft_mesh_003");
    assert_eq!(open.tracks[0].meta.target, TargetPath::Translation);

    let TrackData::Vector3(track) = &open.tracks[0].data else {
        panic!("translation track expected");
    };
    assert_eq!(track.interpolation, InterpolationMode::Linear);
    assert!(vec3_approx(track.sample(0.5).unwrap(), Vec3::new(0.0, 0.0, 0.25)));

    let unnamed = &prefab.animations[1];
    assert_eq!(unnamed.name, "anim_1");
}

#[test]
fn malformed_document_is_an_error() {
    let err = GltfLoader::load_from_slice(b"{ not json").unwrap_err();
    assert!(matches!(err, ViewerError::GltfError(_)));
}

// ============================================================================
// Loading from disk
// ============================================================================

#[test]
fn load_blocking_reads_embedded_gltf_file() {
    let dir = temp_dir("embedded");
    let path = dir.join("cabinet.gltf");
    std::fs::write(&path, embedded_document()).unwrap();

    let prefab = load_blocking(path.to_str().unwrap()).unwrap();
    assert_eq!(prefab.name, "Cabinet");
    assert_eq!(prefab.animations.len(), 2);
}

#[test]
fn load_blocking_resolves_external_buffer_next_to_model() {
    let dir = temp_dir("external");
    std::fs::write(dir.join("cabinet.bin"), buffer_bytes()).unwrap();
    let path = dir.join("cabinet.gltf");
    std::fs::write(&path, document("cabinet.bin")).unwrap();

    let prefab = load_blocking(path.to_str().unwrap()).unwrap();
    let drawer = &prefab.nodes[node_index(&prefab, "DrawerLeft_mesh_003")];
    assert_eq!(prefab.meshes[drawer.mesh.unwrap()].positions.len(), 3);
}

#[test]
fn load_blocking_reports_missing_file() {
    let dir = temp_dir("missing");
    let path = dir.join("nope.glb");

    let err = load_blocking(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, ViewerError::AssetNotFound(_)));
}

// ============================================================================
// Background load
// ============================================================================

fn wait_for(load: &ModelLoad) -> LoadState {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match load.poll() {
            LoadState::Pending if Instant::now() < deadline => {
                std::thread::sleep(Duration::from_millis(5));
            }
            state => return state,
        }
    }
}

#[test]
fn model_load_delivers_prefab() {
    let dir = temp_dir("spawn");
    let path = dir.join("cabinet.gltf");
    std::fs::write(&path, embedded_document()).unwrap();

    let load = ModelLoad::spawn(path.to_str().unwrap());
    match wait_for(&load) {
        LoadState::Loaded(prefab) => assert_eq!(prefab.name, "Cabinet"),
        other => panic!("expected a loaded model, got {other:?}"),
    }
}

#[test]
fn viewer_loads_configured_asset_in_background() {
    let dir = temp_dir("viewer");
    let path = dir.join("cabinet.gltf");
    std::fs::write(&path, embedded_document()).unwrap();

    let config = ViewerConfig {
        asset: path.to_str().unwrap().to_string(),
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(config, MetadataTable::new());
    viewer.start_loading();
    assert_eq!(viewer.asset_state(), AssetState::Pending);

    let deadline = Instant::now() + Duration::from_secs(10);
    while viewer.asset_state() == AssetState::Pending && Instant::now() < deadline {
        viewer.tick(0.016);
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(viewer.asset_state(), AssetState::Loaded);
    assert!(viewer.mixer.has_action("LeftDrawerOpen"));
    let target = viewer.target_part().unwrap();
    assert_eq!(viewer.scene.get_node(target).unwrap().name, "LeftWing");
}

#[test]
fn viewer_reports_failed_load() {
    let dir = temp_dir("viewer-missing");
    let config = ViewerConfig {
        asset: dir.join("nope.glb").to_str().unwrap().to_string(),
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(config, MetadataTable::new());
    viewer.start_loading();

    let deadline = Instant::now() + Duration::from_secs(10);
    while viewer.asset_state() == AssetState::Pending && Instant::now() < deadline {
        viewer.tick(0.016);
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(viewer.asset_state(), AssetState::Failed);
    assert!(viewer.model_root().is_none());
}

#[test]
fn target_falls_back_to_first_child_of_root() {
    let config = ViewerConfig {
        target_part: "NoSuchPart".into(),
        ..ViewerConfig::default()
    };
    let mut viewer = Viewer::new(config, MetadataTable::new());
    viewer.on_model_loaded(&load_fixture());

    let target = viewer.target_part().unwrap();
    assert_eq!(viewer.scene.get_node(target).unwrap().name, "Body");
}
