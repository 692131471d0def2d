//! The viewer context.
//!
//! [`Viewer`] owns every piece of session state: the scene, camera and orbit
//! controls, the animation mixer and toggle table, part metadata, the
//! tooltip and the recolor target. Platform front ends feed it
//! [`ViewerEvent`]s and call [`Viewer::tick`] once per frame; tests drive
//! the same handlers directly.

pub mod color_controls;
pub mod dispatch;
pub mod toggle;
pub mod tooltip;

pub use color_controls::ColorControls;
pub use toggle::{AnimationToggleController, ToggleState};
pub use tooltip::Tooltip;

use glam::{Vec2, Vec3};

use crate::animation::{AnimationAction, AnimationMixer, Binder};
use crate::assets::{LoadState, ModelLoad, Prefab};
use crate::color;
use crate::config::ViewerConfig;
use crate::errors::ViewerError;
use crate::metadata::MetadataTable;
use crate::resources::Input;
use crate::scene::{Camera, Light, NodeHandle, Scene};
use crate::utils::OrbitControls;

/// Inputs the viewer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    /// Primary button released at a viewport position.
    Click(Vec2),
    PointerMove(Vec2),
    /// A color swatch was activated with this color value.
    ColorSelected(String),
    Resize(u32, u32),
    /// Frame boundary with the elapsed seconds since the previous one.
    Frame(f32),
}

/// Where the one model load stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetState {
    /// No load has been started.
    Idle,
    Pending,
    Loaded,
    /// Terminal; the viewer stays empty.
    Failed,
}

pub struct Viewer {
    pub config: ViewerConfig,
    pub scene: Scene,
    pub camera: Camera,
    pub controls: OrbitControls,
    pub input: Input,
    pub mixer: AnimationMixer,
    pub toggles: AnimationToggleController,
    pub metadata: MetadataTable,
    pub tooltip: Tooltip,
    pub color_controls: ColorControls,

    model_root: Option<NodeHandle>,
    target_part: Option<NodeHandle>,
    load: Option<ModelLoad>,
    asset_state: AssetState,
    viewport: Vec2,
}

impl Viewer {
    #[must_use]
    pub fn new(config: ViewerConfig, metadata: MetadataTable) -> Self {
        let viewport = Vec2::new(config.window.width as f32, config.window.height as f32);

        let cam = &config.camera;
        let mut camera = Camera::new_perspective(cam.fov, viewport.x / viewport.y.max(1.0), cam.near, cam.far);
        camera.transform.position = cam.position;
        camera.transform.look_at(cam.target, Vec3::Y);
        camera.update_matrices();

        let controls = OrbitControls::from_position(cam.position, cam.target);

        let mut input = Input::new();
        input.inject_resize(config.window.width, config.window.height);

        let mut viewer = Self {
            toggles: AnimationToggleController::from_rules(&config.toggle_rules),
            color_controls: ColorControls::new(config.swatches.clone()),
            scene: Scene::new(),
            camera,
            controls,
            input,
            mixer: AnimationMixer::new(),
            metadata,
            tooltip: Tooltip::default(),
            model_root: None,
            target_part: None,
            load: None,
            asset_state: AssetState::Idle,
            viewport,
            config,
        };
        viewer.apply_environment();
        viewer
    }

    /// Builds a viewer from `config`, reading its metadata file if one is
    /// configured. A missing or malformed metadata file leaves the table
    /// empty.
    #[must_use]
    pub fn from_config(config: ViewerConfig) -> Self {
        let metadata = match &config.metadata {
            Some(path) => MetadataTable::from_file(path).unwrap_or_else(|e| {
                log::warn!("No part metadata from {}: {e}", path.display());
                MetadataTable::new()
            }),
            None => MetadataTable::new(),
        };
        Self::new(config, metadata)
    }

    /// Background color and lights from the config.
    fn apply_environment(&mut self) {
        let lighting = &self.config.lighting;

        if let Some(bg) = color::parse_linear(&self.config.background) {
            self.scene.set_background(bg);
        }

        let sky = color::parse_linear(&lighting.hemisphere_sky).unwrap_or(Vec3::ONE);
        let ground = color::parse_linear(&lighting.hemisphere_ground).unwrap_or(Vec3::ZERO);
        self.scene
            .add_light(Light::new_hemisphere(sky, ground, lighting.hemisphere_intensity));

        let sun = color::parse_linear(&lighting.directional_color).unwrap_or(Vec3::ONE);
        self.scene.add_light(Light::new_directional(
            sun,
            lighting.directional_intensity,
            lighting.directional_position,
        ));
    }

    // ========================================================================
    // State
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn model_root(&self) -> Option<NodeHandle> {
        self.model_root
    }

    #[inline]
    #[must_use]
    pub fn target_part(&self) -> Option<NodeHandle> {
        self.target_part
    }

    #[inline]
    #[must_use]
    pub fn asset_state(&self) -> AssetState {
        self.asset_state
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Starts the one background load of the configured asset.
    pub fn start_loading(&mut self) {
        if self.asset_state != AssetState::Idle {
            return;
        }
        self.load = Some(ModelLoad::spawn(self.config.asset.clone()));
        self.asset_state = AssetState::Pending;
    }

    /// Drains the load channel; runs the continuation when a result is in.
    pub fn poll_load(&mut self) {
        let Some(load) = &self.load else {
            return;
        };
        match load.poll() {
            LoadState::Pending => {}
            LoadState::Loaded(prefab) => {
                self.load = None;
                self.on_model_loaded(&prefab);
            }
            LoadState::Failed(e) => {
                self.load = None;
                self.on_load_failed(&e);
            }
        }
    }

    /// Attaches the model, creates one action per clip and resolves the
    /// recolor target.
    pub fn on_model_loaded(&mut self, prefab: &Prefab) {
        if self.model_root.is_some() {
            log::warn!("Ignoring second model '{}'", prefab.name);
            return;
        }

        let root = self.scene.instantiate(prefab);

        for clip in &prefab.animations {
            let mut action = AnimationAction::new(clip.clone());
            action.bindings = Binder::bind(&self.scene, root, clip);
            self.mixer.add_action(action);
        }

        self.target_part = self
            .scene
            .find_by_name(root, &self.config.target_part)
            .or_else(|| self.scene.first_child(root));
        self.model_root = Some(root);
        self.asset_state = AssetState::Loaded;
        self.scene.update_matrix_world();

        log::info!(
            "Loaded model '{}' ({} parts, {} animations)",
            prefab.name,
            prefab.nodes.len(),
            prefab.animations.len()
        );
    }

    pub fn on_load_failed(&mut self, error: &ViewerError) {
        log::error!("Failed to load '{}': {error}", self.config.asset);
        self.asset_state = AssetState::Failed;
    }

    // ========================================================================
    // Events
    // ========================================================================

    pub fn handle_event(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::Click(pointer) => self.on_click(pointer),
            ViewerEvent::PointerMove(pointer) => self.on_pointer_move(pointer),
            ViewerEvent::ColorSelected(value) => {
                self.on_color_selected(&value);
            }
            ViewerEvent::Resize(width, height) => self.resize(width, height),
            ViewerEvent::Frame(dt) => self.tick(dt),
        }
    }

    /// Recolors the target part. Returns whether a material changed.
    pub fn on_color_selected(&mut self, value: &str) -> bool {
        ColorControls::apply(&mut self.scene, self.target_part, value)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.input.inject_resize(width, height);
        self.camera.set_aspect(self.viewport.x, self.viewport.y);
        self.camera.update_matrices();
    }

    /// One frame of simulation: finish the load if ready, advance the
    /// animations, move the camera and refresh world matrices.
    pub fn tick(&mut self, dt: f32) {
        self.poll_load();

        self.mixer.update(dt, &mut self.scene);

        let fov = self.camera.fov_degrees();
        self.controls
            .update(&mut self.camera.transform, &self.input, fov, dt);
        self.camera.update_matrices();

        self.scene.update_matrix_world();
        self.input.start_frame();
    }
}
