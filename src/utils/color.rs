//! Palette handling for particle types
//!
//! Palettes are stored in configuration as hex strings (`"#FF00FF"`) and
//! parsed into Bevy colors when drawn. Type `i` uses entry `i`.

use crate::physics::particles::ParticleType;
use bevy::color::{Color, Srgba};

/// Parses every palette entry, reporting the first one that is not a hex color
pub fn parse_palette(palette: &[String]) -> Result<Vec<Color>, String> {
    palette
        .iter()
        .enumerate()
        .map(|(index, hex)| {
            Srgba::hex(hex.trim())
                .map(Color::from)
                .map_err(|err| format!("entry {index} ({hex:?}): {err}"))
        })
        .collect()
}

/// Color of one particle type, falling back to white past the end of the palette
pub fn color_for_type(palette: &[Color], particle_type: ParticleType) -> Color {
    palette
        .get(particle_type.index())
        .copied()
        .unwrap_or(Color::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_default_palette() {
        let palette: Vec<String> = ["#FFFF00", "#ff0000", "00FF00"]
            .map(String::from)
            .to_vec();
        let colors = parse_palette(&palette).unwrap();

        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], Color::from(Srgba::rgb(1.0, 1.0, 0.0)));
        assert_eq!(colors[1], Color::from(Srgba::rgb(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rejects_malformed_entry() {
        let palette = vec!["#FFFF00".to_string(), "yellow".to_string()];
        let err = parse_palette(&palette).unwrap_err();
        assert!(err.starts_with("entry 1"));
    }

    #[test]
    fn test_color_for_type_falls_back_to_white() {
        let palette = vec![Color::BLACK];
        assert_eq!(color_for_type(&palette, ParticleType(0)), Color::BLACK);
        assert_eq!(color_for_type(&palette, ParticleType(4)), Color::WHITE);
    }
}
