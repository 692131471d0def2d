//! CSS-style color strings.
//!
//! Accepted forms: `#rgb`, `#rrggbb`, `0xrrggbb`, `rgb(r, g, b)` with 0-255
//! components, and the CSS basic color keywords. Parsed values are sRGB;
//! [`parse_linear`] converts to the linear space materials store.

use glam::Vec3;

const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x00_0000),
    ("silver", 0xc0_c0c0),
    ("gray", 0x80_8080),
    ("grey", 0x80_8080),
    ("white", 0xff_ffff),
    ("maroon", 0x80_0000),
    ("red", 0xff_0000),
    ("purple", 0x80_0080),
    ("fuchsia", 0xff_00ff),
    ("magenta", 0xff_00ff),
    ("green", 0x00_8000),
    ("lime", 0x00_ff00),
    ("olive", 0x80_8000),
    ("yellow", 0xff_ff00),
    ("navy", 0x00_0080),
    ("blue", 0x00_00ff),
    ("teal", 0x00_8080),
    ("aqua", 0x00_ffff),
    ("cyan", 0x00_ffff),
    ("orange", 0xff_a500),
];

/// `0xRRGGBB` to sRGB components in [0, 1].
#[must_use]
pub fn hex_to_rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Parses a color string into sRGB components. `None` for anything unrecognized.
#[must_use]
pub fn parse_srgb(value: &str) -> Option<Vec3> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex_digits(hex);
    }
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        return (hex.len() == 6).then(|| parse_hex_digits(hex)).flatten();
    }

    let lower = value.to_ascii_lowercase();
    if let Some(body) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        return parse_rgb_function(body);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|&(_, hex)| hex_to_rgb(hex))
}

/// Parses a color string and converts it to linear RGB.
///
/// Invalid input is reported with a warning and yields `None`.
#[must_use]
pub fn parse_linear(value: &str) -> Option<Vec3> {
    let Some(srgb) = parse_srgb(value) else {
        log::warn!("Unknown color '{value}'");
        return None;
    };
    Some(srgb_to_linear(srgb))
}

#[must_use]
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    Vec3::new(channel_to_linear(c.x), channel_to_linear(c.y), channel_to_linear(c.z))
}

#[must_use]
pub fn linear_to_srgb(c: Vec3) -> Vec3 {
    Vec3::new(channel_to_srgb(c.x), channel_to_srgb(c.y), channel_to_srgb(c.z))
}

fn channel_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.077_399_38
    } else {
        (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
    }
}

fn channel_to_srgb(c: f32) -> f32 {
    if c < 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(0.41666) - 0.055
    }
}

fn parse_hex_digits(hex: &str) -> Option<Vec3> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok().map(hex_to_rgb)
        }
        6 => u32::from_str_radix(hex, 16).ok().map(hex_to_rgb),
        _ => None,
    }
}

fn parse_rgb_function(body: &str) -> Option<Vec3> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let [r, g, b] = parts.as_slice() else {
        return None;
    };
    let component = |s: &str| s.parse::<u8>().ok().map(|v| f32::from(v) / 255.0);
    Some(Vec3::new(component(r)?, component(g)?, component(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn parses_long_hex() {
        assert!(close(parse_srgb("#ff0000").unwrap(), Vec3::X));
        assert!(close(parse_srgb("#00FF00").unwrap(), Vec3::Y));
    }

    #[test]
    fn parses_short_hex() {
        assert!(close(parse_srgb("#00f").unwrap(), Vec3::Z));
    }

    #[test]
    fn parses_0x_prefix_and_rgb_function() {
        assert!(close(parse_srgb("0xffffff").unwrap(), Vec3::ONE));
        assert!(close(parse_srgb("rgb(255, 0, 0)").unwrap(), Vec3::X));
    }

    #[test]
    fn parses_keywords_case_insensitively() {
        assert!(close(parse_srgb("Red").unwrap(), Vec3::X));
        assert!(close(parse_srgb("white").unwrap(), Vec3::ONE));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_srgb("#ggg").is_none());
        assert!(parse_srgb("#12345").is_none());
        assert!(parse_srgb("rgb(300, 0, 0)").is_none());
        assert!(parse_srgb("rgb(1, 2)").is_none());
        assert!(parse_srgb("notacolor").is_none());
        assert!(parse_linear("").is_none());
    }

    #[test]
    fn primaries_survive_linear_conversion() {
        assert!(close(parse_linear("#ff0000").unwrap(), Vec3::X));
        let mid = srgb_to_linear(Vec3::splat(0.5));
        assert!((mid.x - 0.214).abs() < 1e-3);
        assert!(close(linear_to_srgb(mid), Vec3::splat(0.5)));
    }
}
