//! Pointer picking and the click / hover handlers built on it.

use glam::Vec2;

use crate::raycast::{Intersection, Raycaster, pointer_to_ndc};
use crate::viewer::Viewer;

impl Viewer {
    /// Nearest part under `pointer` (viewport pixels).
    ///
    /// Pure query. Returns `None` before the model is loaded, when the
    /// viewport is degenerate, or when the ray misses every part.
    #[must_use]
    pub fn pick(&self, pointer: Vec2) -> Option<Intersection> {
        let root = self.model_root?;
        let ndc = pointer_to_ndc(pointer, self.viewport)?;

        let mut raycaster = Raycaster::default();
        raycaster.set_from_camera(ndc, &self.camera);
        raycaster.intersect_nearest(&self.scene, root)
    }

    /// Identifier of the nearest part under `pointer`.
    #[must_use]
    pub fn pick_name(&self, pointer: Vec2) -> Option<String> {
        self.pick(pointer).map(|hit| hit.name)
    }

    /// Click: log the part and run every toggle rule whose substring it
    /// contains. Rules are independent, so one part may trigger several.
    pub fn on_click(&mut self, pointer: Vec2) {
        let Some(part) = self.pick_name(pointer) else {
            return;
        };
        log::info!("Clicked: {part}");

        for rule in &self.config.toggle_rules {
            if part.contains(rule.contains.as_str()) && self.mixer.has_action(&rule.animation) {
                self.toggles.toggle(&rule.animation, &mut self.mixer);
            }
        }
    }

    /// Hover: show the metadata card of the part under the pointer.
    ///
    /// A miss or a part without metadata leaves the card as it was, unless
    /// `hide_tooltip_on_miss` is set.
    pub fn on_pointer_move(&mut self, pointer: Vec2) {
        if self.model_root.is_none() {
            return;
        }

        let info = self
            .pick_name(pointer)
            .and_then(|part| self.metadata.get(&part).cloned());

        match info {
            Some(info) => self.tooltip.show(info, pointer, self.config.tooltip_offset),
            None if self.config.hide_tooltip_on_miss => self.tooltip.hide(),
            None => {}
        }
    }
}
