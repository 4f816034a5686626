// src/color.rs
//! Color constants and the disabled-rendering transform
//!
//! The framework works in `Rgb888` (8-bit channels) so the grey transform is
//! exact integer arithmetic; the drawing adapter converts to the panel's
//! native color on the way out (typically `Rgb565`).

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

// ============================================================================
// Named colors
// ============================================================================

pub const WHITE: Rgb888 = Rgb888::new(255, 255, 255);
pub const BLACK: Rgb888 = Rgb888::new(0, 0, 0);
pub const RED: Rgb888 = Rgb888::new(255, 0, 0);
pub const GREEN: Rgb888 = Rgb888::new(0, 255, 0);
pub const BLUE: Rgb888 = Rgb888::new(0, 0, 255);
pub const YELLOW: Rgb888 = Rgb888::new(255, 255, 0);
pub const GREY: Rgb888 = Rgb888::new(100, 100, 100);

// ============================================================================
// Grey (disabled) transform
// ============================================================================

/// Perceptual luminance of a color, integer Rec. 601 weights.
pub fn luminance(c: Rgb888) -> u8 {
    let l = 299 * c.r() as u32 + 587 * c.g() as u32 + 114 * c.b() as u32;
    (l / 1000) as u8
}

/// Dims a color for disabled rendering.
///
/// With `desaturate` the color first collapses to a grey of equal perceptual
/// luminance; each channel is then divided by `factor`. The caller validates
/// `factor > 1` (see [`crate::style::StyleConfig::set_grey_style`]).
pub fn dim(c: Rgb888, desaturate: bool, factor: f32) -> Rgb888 {
    let (r, g, b) = if desaturate {
        let l = luminance(c);
        (l, l, l)
    } else {
        (c.r(), c.g(), c.b())
    };
    Rgb888::new(
        (r as f32 / factor) as u8,
        (g as f32 / factor) as u8,
        (b as f32 / factor) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_divides_channels() {
        let dimmed = dim(Rgb888::new(200, 100, 50), false, 2.0);
        assert_eq!(dimmed, Rgb888::new(100, 50, 25));
    }

    #[test]
    fn test_dim_desaturates_to_equal_luminance() {
        let base = Rgb888::new(200, 100, 50);
        let l = luminance(base);
        let dimmed = dim(base, true, 2.0);
        assert_eq!(dimmed, Rgb888::new(l / 2, l / 2, l / 2));
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(WHITE), 255);
        assert_eq!(luminance(BLACK), 0);
        // Green dominates the weighting
        assert!(luminance(GREEN) > luminance(RED));
        assert!(luminance(RED) > luminance(BLUE));
    }
}
