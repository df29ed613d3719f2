//! Palette quantization for PNG output.
//!
//! Quality picks a colour budget; the image is dithered (Floyd-Steinberg)
//! onto the largest uniform RGB cube that fits in that budget. Fewer distinct
//! colours give deflate longer runs to work with. Alpha is left untouched.

use image::imageops::{self, ColorMap};
use image::{DynamicImage, Rgba, RgbaImage};

/// Colour budget for a quality setting: 16 colours at the bottom, 256 at 100
pub fn palette_size(quality: u8) -> u32 {
    (16 + quality as u32 * 240 / 100).clamp(16, 256)
}

/// A uniform RGB palette with `levels` steps per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformPalette {
    levels: u8,
}

impl UniformPalette {
    /// The largest uniform cube with at most `colors` entries (at least 2 levels)
    pub fn for_colors(colors: u32) -> Self {
        let levels = (2..=6u32)
            .rev()
            .find(|n| n * n * n <= colors)
            .unwrap_or(2) as u8;
        Self { levels }
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    fn level_of(&self, value: u8) -> usize {
        let steps = (self.levels - 1) as u32;
        ((value as u32 * steps + 127) / 255) as usize
    }

    fn value_of(&self, level: usize) -> u8 {
        let steps = (self.levels - 1) as u32;
        ((level as u32 * 255 + steps / 2) / steps) as u8
    }
}

impl ColorMap for UniformPalette {
    type Color = Rgba<u8>;

    fn index_of(&self, color: &Rgba<u8>) -> usize {
        let l = self.levels as usize;
        let [r, g, b, _] = color.0;
        self.level_of(r) * l * l + self.level_of(g) * l + self.level_of(b)
    }

    fn map_color(&self, color: &mut Rgba<u8>) {
        for channel in color.0.iter_mut().take(3) {
            *channel = self.value_of(self.level_of(*channel));
        }
    }
}

/// Dither `image` onto the palette chosen for `quality`
pub fn quantize(image: &DynamicImage, quality: u8) -> RgbaImage {
    let mut rgba = image.to_rgba8();
    let palette = UniformPalette::for_colors(palette_size(quality));
    imageops::dither(&mut rgba, &palette);
    rgba
}
