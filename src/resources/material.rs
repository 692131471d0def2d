use glam::{Vec3, Vec4};

/// Flat-shaded surface description. `color` is linear RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub color: Vec4,
    pub double_sided: bool,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>, color: Vec4) -> Self {
        Self {
            name: name.into(),
            color,
            double_sided: false,
        }
    }

    /// Replaces the RGB part of the color and keeps alpha.
    pub fn set_color(&mut self, rgb: Vec3) {
        self.color = rgb.extend(self.color.w);
    }

    #[must_use]
    pub fn rgb(&self) -> Vec3 {
        self.color.truncate()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("Default", Vec4::ONE)
    }
}
