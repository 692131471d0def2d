use glam::Vec3;

/// Sky/ground gradient ambient light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub ground_color: Vec3,
}

/// Parallel light shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize_or(Vec3::NEG_Y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
}

/// Light colors are linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl Light {
    #[must_use]
    pub fn new_hemisphere(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Self {
        Self {
            color: sky_color,
            intensity,
            kind: LightKind::Hemisphere(HemisphereLight { ground_color }),
        }
    }

    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional(DirectionalLight { position }),
        }
    }
}
