//! Viewer Interaction Tests
//!
//! Tests for:
//! - Click handling: substring rules, independent rules, missing animations
//! - Toggle state machine: open, close, reversal while moving
//! - Hover tooltip: metadata lookup, offset, sticky vs. hide-on-miss
//! - Recoloring the target part, target fallback, invalid colors
//! - Behavior before a model is loaded

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use part_viewer::animation::{
    AnimationClip, AnimationMixer, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData,
    TrackMeta,
};
use part_viewer::assets::{Prefab, PrefabNode};
use part_viewer::config::{CameraConfig, ToggleRule, ViewerConfig, WindowConfig};
use part_viewer::errors::ViewerError;
use part_viewer::metadata::{MetadataTable, PartMetadata};
use part_viewer::resources::{Material, Mesh};
use part_viewer::viewer::{AnimationToggleController, AssetState, ToggleState, Viewer, ViewerEvent};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

const DRAWER: &str = "DrawerLeft_mesh_003";
const PANEL: &str = "MiddleWingPanel";
const FUSELAGE: &str = "Fuselage";
const WING: &str = "LeftWing";

fn config() -> ViewerConfig {
    ViewerConfig {
        camera: CameraConfig {
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            ..CameraConfig::default()
        },
        window: WindowConfig {
            width: 800,
            height: 600,
            ..WindowConfig::default()
        },
        ..ViewerConfig::default()
    }
}

fn metadata() -> MetadataTable {
    MetadataTable::new()
        .with_entry(
            DRAWER,
            PartMetadata::new("Left drawer", "Oak", "Slides out towards the viewer."),
        )
        .with_entry(WING, PartMetadata::new("Wing", "Aluminum", "Left wing assembly"))
}

fn quad() -> Mesh {
    Mesh::new(
        "Quad",
        vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ],
        None,
        Some(vec![0, 1, 2, 0, 2, 3]),
    )
}

fn slide(name: &str, node: &str, from: Vec3, to: Vec3, duration: f32) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: node.to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![from, to],
                InterpolationMode::Linear,
            )),
        }],
    ))
}

/// Four quads facing the camera: the drawer in the middle, the panel to the
/// right, the fuselage to the left and the wing above.
fn model() -> Prefab {
    let mut prefab = Prefab::new("Model");
    prefab.meshes.push(quad());

    let parts = [
        (WING, Vec3::new(0.0, 2.0, 0.0)),
        (DRAWER, Vec3::ZERO),
        (PANEL, Vec3::new(2.0, 0.0, 0.0)),
        (FUSELAGE, Vec3::new(-2.0, 0.0, 0.0)),
    ];
    for (name, position) in parts {
        let material = prefab.materials.len();
        prefab.materials.push(Material::new(name, Vec4::ONE));

        let mut node = PrefabNode::new(name);
        node.transform.position = position;
        node.mesh = Some(0);
        node.material = Some(material);
        let index = prefab.add_node(node);
        prefab.root_indices.push(index);
    }

    prefab.animations.push(slide(
        "LeftDrawerOpen",
        DRAWER,
        Vec3::ZERO,
        Vec3::new(0.0, 0.0, 1.0),
        1.0,
    ));
    prefab.animations.push(slide(
        "MiddleOpen",
        PANEL,
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 1.0),
        2.0,
    ));
    prefab
}

fn loaded_viewer(config: ViewerConfig) -> Viewer {
    let mut viewer = Viewer::new(config, metadata());
    viewer.on_model_loaded(&model());
    viewer
}

/// Viewport pixel a world-space point projects to.
fn pixel_of(viewer: &Viewer, world: Vec3) -> Vec2 {
    let ndc = viewer.camera.view_projection_matrix().project_point3(world);
    let viewport = viewer.viewport();
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.x,
        (1.0 - ndc.y) * 0.5 * viewport.y,
    )
}

fn center(viewer: &Viewer) -> Vec2 {
    viewer.viewport() * 0.5
}

fn action_time(viewer: &Viewer, name: &str) -> f32 {
    viewer.mixer.action(name).unwrap().time
}

// ============================================================================
// Before load
// ============================================================================

#[test]
fn events_before_load_are_no_ops() {
    let mut viewer = Viewer::new(config(), metadata());
    let pointer = center(&viewer);

    assert!(viewer.pick(pointer).is_none());
    viewer.handle_event(ViewerEvent::Click(pointer));
    viewer.handle_event(ViewerEvent::PointerMove(pointer));
    assert!(!viewer.on_color_selected("#ff0000"));

    assert!(!viewer.tooltip.visible);
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));
    assert_eq!(viewer.asset_state(), AssetState::Idle);
    assert!(viewer.model_root().is_none());
}

#[test]
fn load_failure_leaves_viewer_empty() {
    let mut viewer = Viewer::new(config(), metadata());
    viewer.on_load_failed(&ViewerError::AssetNotFound("model.glb".into()));

    assert_eq!(viewer.asset_state(), AssetState::Failed);
    assert!(viewer.model_root().is_none());
    viewer.tick(0.016);
}

#[test]
fn model_load_creates_one_action_per_clip() {
    let viewer = loaded_viewer(config());

    assert_eq!(viewer.asset_state(), AssetState::Loaded);
    assert_eq!(viewer.mixer.len(), 2);
    assert!(viewer.mixer.has_action("LeftDrawerOpen"));
    assert!(viewer.mixer.has_action("MiddleOpen"));
    assert!(!viewer.mixer.action("LeftDrawerOpen").unwrap().is_running());
}

#[test]
fn second_model_is_ignored() {
    let mut viewer = loaded_viewer(config());
    let root = viewer.model_root();
    let nodes = viewer.scene.nodes.len();

    viewer.on_model_loaded(&model());

    assert_eq!(viewer.model_root(), root);
    assert_eq!(viewer.scene.nodes.len(), nodes);
    assert_eq!(viewer.mixer.len(), 2);
}

// ============================================================================
// Picking
// ============================================================================

#[test]
fn pick_returns_part_under_pointer() {
    let viewer = loaded_viewer(config());

    assert_eq!(viewer.pick_name(center(&viewer)).as_deref(), Some(DRAWER));
    let panel = pixel_of(&viewer, Vec3::new(2.0, 0.0, 0.0));
    assert_eq!(viewer.pick_name(panel).as_deref(), Some(PANEL));
    assert!(viewer.pick_name(Vec2::new(5.0, 5.0)).is_none());
}

// ============================================================================
// Click → toggle
// ============================================================================

#[test]
fn click_opens_then_closes_drawer() {
    let mut viewer = loaded_viewer(config());

    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Open));
    let action = viewer.mixer.action("LeftDrawerOpen").unwrap();
    assert!(action.is_running());
    assert!(approx(action.time_scale, 1.0));

    viewer.tick(2.0);
    let action = viewer.mixer.action("LeftDrawerOpen").unwrap();
    assert!(action.is_finished());
    assert!(approx(action.time, 1.0));
    let drawer = viewer.scene.find_by_name(viewer.model_root().unwrap(), DRAWER).unwrap();
    assert!(approx(viewer.scene.get_node(drawer).unwrap().transform.position.z, 1.0));

    // The open drawer still covers the center of the screen.
    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));
    let action = viewer.mixer.action("LeftDrawerOpen").unwrap();
    assert!(approx(action.time_scale, -1.0));
    assert!(approx(action.time, 1.0));

    viewer.tick(2.0);
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.0));
    assert!(approx(viewer.scene.get_node(drawer).unwrap().transform.position.z, 0.0));
}

#[test]
fn click_while_moving_reverses_from_current_time() {
    let mut viewer = loaded_viewer(config());

    viewer.on_click(center(&viewer));
    viewer.tick(0.4);
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.4));

    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));
    let action = viewer.mixer.action("LeftDrawerOpen").unwrap();
    assert!(approx(action.time, 0.4));
    assert!(approx(action.time_scale, -1.0));

    viewer.tick(0.1);
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.3));

    // And back again, still from where it is.
    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Open));
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.3));
}

#[test]
fn close_survives_a_zero_length_frame() {
    let mut viewer = loaded_viewer(config());

    viewer.on_click(center(&viewer));
    for _ in 0..20 {
        viewer.tick(0.1);
    }
    assert!(viewer.mixer.action("LeftDrawerOpen").unwrap().is_finished());

    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));

    viewer.handle_event(ViewerEvent::Frame(0.0));
    let action = viewer.mixer.action("LeftDrawerOpen").unwrap();
    assert!(!action.is_finished());
    assert!(approx(action.time, 1.0));

    for _ in 0..20 {
        viewer.tick(0.1);
    }
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.0));
    let drawer = viewer.scene.find_by_name(viewer.model_root().unwrap(), DRAWER).unwrap();
    assert!(approx(viewer.scene.get_node(drawer).unwrap().transform.position.z, 0.0));

    // The next click opens from the closed pose.
    viewer.on_click(center(&viewer));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Open));
    assert!(approx(action_time(&viewer, "LeftDrawerOpen"), 0.0));
}

#[test]
fn click_matches_rule_by_substring() {
    let mut viewer = loaded_viewer(config());

    let panel = pixel_of(&viewer, Vec3::new(2.0, 0.0, 0.0));
    viewer.on_click(panel);

    assert_eq!(viewer.toggles.state("MiddleOpen"), Some(ToggleState::Open));
    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));
}

#[test]
fn click_on_part_without_rule_changes_nothing() {
    let mut viewer = loaded_viewer(config());

    let fuselage = pixel_of(&viewer, Vec3::new(-2.0, 0.0, 0.0));
    assert_eq!(viewer.pick_name(fuselage).as_deref(), Some(FUSELAGE));
    viewer.on_click(fuselage);
    viewer.on_click(Vec2::new(5.0, 5.0));

    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Closed));
    assert_eq!(viewer.toggles.state("MiddleOpen"), Some(ToggleState::Closed));
    assert!(!viewer.mixer.action("MiddleOpen").unwrap().is_running());
}

#[test]
fn every_matching_rule_fires() {
    let mut config = config();
    config.toggle_rules = vec![
        ToggleRule::new("Drawer", "LeftDrawerOpen"),
        ToggleRule::new("mesh_003", "MiddleOpen"),
    ];
    let mut viewer = loaded_viewer(config);

    viewer.on_click(center(&viewer));

    assert_eq!(viewer.toggles.state("LeftDrawerOpen"), Some(ToggleState::Open));
    assert_eq!(viewer.toggles.state("MiddleOpen"), Some(ToggleState::Open));
}

#[test]
fn rule_for_missing_animation_is_skipped() {
    let mut config = config();
    config.toggle_rules = vec![ToggleRule::new("Fuselage", "FuselageSpin")];
    let mut viewer = loaded_viewer(config);

    let fuselage = pixel_of(&viewer, Vec3::new(-2.0, 0.0, 0.0));
    viewer.on_click(fuselage);

    assert_eq!(viewer.toggles.state("FuselageSpin"), Some(ToggleState::Closed));
}

#[test]
fn toggle_controller_rejects_unknown_names() {
    let mut toggles = AnimationToggleController::from_rules(&[ToggleRule::new("A", "Open")]);
    let mut mixer = AnimationMixer::new();

    assert!(!toggles.toggle("Nope", &mut mixer));
    // Known name, but no action to drive.
    assert!(!toggles.toggle("Open", &mut mixer));
    assert_eq!(toggles.state("Open"), Some(ToggleState::Closed));
    assert!(toggles.state("Nope").is_none());
}

// ============================================================================
// Tooltip
// ============================================================================

#[test]
fn hover_shows_metadata_with_offset() {
    let mut viewer = loaded_viewer(config());
    let pointer = center(&viewer);

    viewer.handle_event(ViewerEvent::PointerMove(pointer));

    assert!(viewer.tooltip.visible);
    assert_eq!(viewer.tooltip.anchor, pointer);
    assert_eq!(viewer.tooltip.screen_position(1.0), pointer + Vec2::new(10.0, 10.0));
    assert_eq!(
        viewer.tooltip.html().as_deref(),
        Some("<strong>Left drawer</strong><br>\nMaterial: Oak<br>\nSlides out towards the viewer.")
    );
}

#[test]
fn hover_over_wing_shows_its_card() {
    let mut viewer = loaded_viewer(config());
    let pointer = pixel_of(&viewer, Vec3::new(0.0, 2.0, 0.0));

    viewer.on_pointer_move(pointer);

    let content = viewer.tooltip.content.as_ref().unwrap();
    assert_eq!(content, &PartMetadata::new("Wing", "Aluminum", "Left wing assembly"));
    assert_eq!(viewer.tooltip.anchor, pointer);
    assert_eq!(viewer.tooltip.screen_position(1.0), pointer + Vec2::new(10.0, 10.0));
    assert_eq!(
        viewer.tooltip.html().as_deref(),
        Some("<strong>Wing</strong><br>\nMaterial: Aluminum<br>\nLeft wing assembly")
    );
}

#[test]
fn tooltip_sticks_on_miss_by_default() {
    let mut viewer = loaded_viewer(config());
    viewer.on_pointer_move(center(&viewer));

    viewer.on_pointer_move(Vec2::new(5.0, 5.0));
    assert!(viewer.tooltip.visible);

    // Parts without metadata leave it alone too.
    let panel = pixel_of(&viewer, Vec3::new(2.0, 0.0, 0.0));
    viewer.on_pointer_move(panel);
    assert_eq!(viewer.tooltip.content.as_ref().unwrap().label, "Left drawer");
}

#[test]
fn tooltip_hides_on_miss_when_configured() {
    let mut config = config();
    config.hide_tooltip_on_miss = true;
    let mut viewer = loaded_viewer(config);

    viewer.on_pointer_move(center(&viewer));
    assert!(viewer.tooltip.visible);

    viewer.on_pointer_move(Vec2::new(5.0, 5.0));
    assert!(!viewer.tooltip.visible);
    assert!(viewer.tooltip.html().is_none());
}

// ============================================================================
// Recoloring
// ============================================================================

fn target_color(viewer: &Viewer) -> Vec4 {
    let target = viewer.target_part().unwrap();
    let key = viewer.scene.get_node(target).unwrap().material.unwrap();
    viewer.scene.materials[key].color
}

#[test]
fn color_selection_recolors_target_part() {
    let mut viewer = loaded_viewer(config());
    let target = viewer.target_part().unwrap();
    assert_eq!(viewer.scene.get_node(target).unwrap().name, WING);

    viewer.handle_event(ViewerEvent::ColorSelected("#ff0000".into()));

    let color = target_color(&viewer);
    assert!(approx(color.x, 1.0));
    assert!(approx(color.y, 0.0));
    assert!(approx(color.z, 0.0));
    assert!(approx(color.w, 1.0));
}

#[test]
fn invalid_color_is_ignored() {
    let mut viewer = loaded_viewer(config());

    assert!(!viewer.on_color_selected("not-a-color"));
    assert_eq!(target_color(&viewer), Vec4::ONE);
}

#[test]
fn missing_target_falls_back_to_first_part() {
    let mut config = config();
    config.target_part = "NoSuchPart".into();
    let viewer = loaded_viewer(config);

    let target = viewer.target_part().unwrap();
    assert_eq!(viewer.scene.get_node(target).unwrap().name, WING);
}

#[test]
fn target_without_material_cannot_be_recolored() {
    let mut prefab = Prefab::new("Bare");
    let index = prefab.add_node(PrefabNode::new(WING));
    prefab.root_indices.push(index);

    let mut viewer = Viewer::new(config(), MetadataTable::new());
    viewer.on_model_loaded(&prefab);

    assert!(viewer.target_part().is_some());
    assert!(!viewer.on_color_selected("#00ff00"));
}

// ============================================================================
// Resize and camera
// ============================================================================

#[test]
fn resize_updates_viewport_and_ignores_zero() {
    let mut viewer = loaded_viewer(config());

    viewer.handle_event(ViewerEvent::Resize(1024, 512));
    assert_eq!(viewer.viewport(), Vec2::new(1024.0, 512.0));
    assert!(approx(viewer.camera.aspect, 2.0));

    viewer.handle_event(ViewerEvent::Resize(0, 512));
    assert_eq!(viewer.viewport(), Vec2::new(1024.0, 512.0));

    // Picking follows the new viewport.
    assert_eq!(viewer.pick_name(center(&viewer)).as_deref(), Some(DRAWER));
}

#[test]
fn tick_moves_camera_with_orbit_controls() {
    let mut viewer = loaded_viewer(config());
    let before = viewer.camera.transform.position.length();

    viewer.input.inject_scroll(0.0, 1.0);
    viewer.tick(0.016);

    let after = viewer.camera.transform.position.length();
    assert!(after < before);
    assert!(after > 0.0);
}
