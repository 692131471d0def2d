use glam::Vec2;

use crate::metadata::PartMetadata;

/// Hover card for the part under the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    /// Pointer position the card follows, in viewport pixels.
    pub anchor: Vec2,
    /// Gap between pointer and card, in logical points.
    pub offset: Vec2,
    pub content: Option<PartMetadata>,
}

impl Tooltip {
    pub fn show(&mut self, content: PartMetadata, anchor: Vec2, offset: Vec2) {
        self.content = Some(content);
        self.anchor = anchor;
        self.offset = offset;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Top-left corner of the card in logical points.
    ///
    /// The offset is added after scaling, so it stays the same visual
    /// distance on high-density displays.
    #[must_use]
    pub fn screen_position(&self, pixels_per_point: f32) -> Vec2 {
        let scale = if pixels_per_point > 0.0 { pixels_per_point } else { 1.0 };
        self.anchor / scale + self.offset
    }

    /// Card markup: bold label, then material, then description.
    #[must_use]
    pub fn html(&self) -> Option<String> {
        if !self.visible {
            return None;
        }
        let info = self.content.as_ref()?;
        Some(format!(
            "<strong>{}</strong><br>\nMaterial: {}<br>\n{}",
            info.label, info.material, info.description
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawer() -> PartMetadata {
        PartMetadata::new("Left drawer", "Oak", "Slides out.")
    }

    #[test]
    fn offset_is_applied_in_points() {
        let mut tooltip = Tooltip::default();
        tooltip.show(drawer(), Vec2::new(200.0, 100.0), Vec2::new(10.0, 10.0));

        assert_eq!(tooltip.screen_position(1.0), Vec2::new(210.0, 110.0));
        assert_eq!(tooltip.screen_position(2.0), Vec2::new(110.0, 60.0));
    }

    #[test]
    fn markup_keeps_one_field_per_line() {
        let mut tooltip = Tooltip::default();
        tooltip.show(drawer(), Vec2::ZERO, Vec2::ZERO);

        assert_eq!(
            tooltip.html().as_deref(),
            Some("<strong>Left drawer</strong><br>\nMaterial: Oak<br>\nSlides out.")
        );
        tooltip.hide();
        assert!(tooltip.html().is_none());
    }
}
