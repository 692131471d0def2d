use crate::color;
use crate::config::ColorSwatch;
use crate::scene::{NodeHandle, Scene};

/// Recolor buttons for the target part.
#[derive(Debug, Clone, Default)]
pub struct ColorControls {
    swatches: Vec<ColorSwatch>,
}

impl ColorControls {
    #[must_use]
    pub fn new(swatches: Vec<ColorSwatch>) -> Self {
        Self { swatches }
    }

    #[must_use]
    pub fn swatches(&self) -> &[ColorSwatch] {
        &self.swatches
    }

    /// Sets the material color of `target` to `value`.
    ///
    /// Returns whether a material changed. Unparseable values are reported by
    /// the color parser and leave the material untouched.
    pub fn apply(scene: &mut Scene, target: Option<NodeHandle>, value: &str) -> bool {
        let Some(target) = target else {
            return false;
        };
        let Some(material) = scene.node_material_mut(target) else {
            return false;
        };
        let Some(rgb) = color::parse_linear(value) else {
            return false;
        };
        material.set_color(rgb);
        true
    }
}
