//! Color presets the hero cycles through, one per animation loop.

use bytemuck::{Pod, Zeroable};

/// 0..1 RGB triple, laid out for direct upload as a `vec3` attribute.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };

    /// `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// CSS `rgba()` string, for painting 2D canvas textures.
    pub fn to_css(self, alpha: f32) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            alpha.clamp(0.0, 1.0)
        )
    }
}

/// A named theme: shard colors, the two streak accents and the center glyph.
#[derive(Debug)]
pub struct Preset {
    pub name: &'static str,
    pub shards: &'static [u32],
    pub streak_a: u32,
    pub streak_b: u32,
    pub symbol: char,
}

impl Preset {
    /// Color for shard `index`; shards cycle through the list.
    pub fn shard_color(&self, index: usize) -> Rgb {
        Rgb::from_hex(self.shards[index % self.shards.len()])
    }

    pub fn streak_colors(&self) -> (Rgb, Rgb) {
        (Rgb::from_hex(self.streak_a), Rgb::from_hex(self.streak_b))
    }
}

pub const PRESETS: [Preset; 3] = [
    // pink leaning
    Preset {
        name: "risa",
        shards: &[0xFFC8DD, 0xFFAFCC, 0xFDECEF, 0xE4C1F9, 0xFFD6F0, 0xCDE8FF],
        streak_a: 0xFFD6F0,
        streak_b: 0xCDEBFF,
        symbol: '✷',
    },
    // sky blue and lavender
    Preset {
        name: "lilia",
        shards: &[0xBDE0FE, 0xA2D2FF, 0xE4C1F9, 0xCDE8FF, 0xFDECEF, 0xE3F2FF],
        streak_a: 0xE4C1F9,
        streak_b: 0xBDE0FE,
        symbol: '◆',
    },
    // aqua and baby blue
    Preset {
        name: "personal",
        shards: &[0xCDE8FF, 0xBDE0FE, 0xA2D2FF, 0xD7F6F2, 0xFDECEF, 0xEAF6FF],
        streak_a: 0xCDE8FF,
        streak_b: 0xFFFFFF,
        symbol: '●',
    },
];

/// Preset for a palette index. Any index is valid; it wraps.
pub fn preset(index: usize) -> &'static Preset {
    &PRESETS[index % PRESETS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decodes_channels() {
        let c = Rgb::from_hex(0xFF8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn preset_index_wraps() {
        assert_eq!(preset(0).name, "risa");
        assert_eq!(preset(3).name, "risa");
        assert_eq!(preset(5).name, "personal");
    }

    #[test]
    fn shard_colors_cycle() {
        let p = preset(1);
        assert_eq!(p.shard_color(0), p.shard_color(p.shards.len()));
    }

    #[test]
    fn css_is_clamped() {
        assert_eq!(Rgb::WHITE.to_css(2.0), "rgba(255, 255, 255, 1)");
        assert_eq!(Rgb::from_hex(0x000000).to_css(0.0), "rgba(0, 0, 0, 0)");
    }
}
