// src/style.rs
//! Process-wide style configuration
//!
//! One [`StyleConfig`] per [`crate::engine::Ui`] carries the default colors,
//! the timing defaults shared by all buttons (lit feedback, long press), and
//! the grey parameters for disabled rendering. Widgets override colors per
//! instance; everything else is deliberately global so an application has one
//! consistent look.

use embassy_time::Duration;
use embedded_graphics::pixelcolor::Rgb888;

use crate::color;
use crate::error::UiError;

/// Outline shape of a button's touch-visible area.
///
/// The bounding box used for hit-testing is always the full rectangle,
/// regardless of shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Rectangle,
    ClippedRect,
}

#[derive(Debug, Clone, Copy)]
pub struct StyleConfig {
    /// Default foreground (outline/fill) color
    pub fg: Rgb888,
    /// Default background color, also used to clear screen regions
    pub bg: Rgb888,
    /// Default text color
    pub font_color: Rgb888,
    /// How long a button stays in its lit color after a press
    pub lit_time: Duration,
    /// Press duration after which a bound long-press callback fires
    pub long_press_time: Duration,
    grey_desaturate: bool,
    grey_factor: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            fg: color::WHITE,
            bg: color::BLACK,
            font_color: color::WHITE,
            lit_time: Duration::from_secs(1),
            long_press_time: Duration::from_secs(1),
            grey_desaturate: true,
            grey_factor: 2.0,
        }
    }
}

impl StyleConfig {
    /// Configures disabled rendering for the whole process.
    ///
    /// `factor` divides each channel and must be greater than 1; a smaller
    /// factor is a programmer error and is rejected, never coerced.
    pub fn set_grey_style(&mut self, desaturate: bool, factor: f32) -> Result<(), UiError> {
        if factor <= 1.0 {
            return Err(UiError::InvalidGreyFactor(factor));
        }
        self.grey_desaturate = desaturate;
        self.grey_factor = factor;
        Ok(())
    }

    /// Maps a widget's base color to its rendered color.
    ///
    /// Enabled widgets render unchanged; disabled ones get the grey transform.
    pub fn render_color(&self, base: Rgb888, enabled: bool) -> Rgb888 {
        if enabled {
            base
        } else {
            color::dim(base, self.grey_desaturate, self.grey_factor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grey_factor_of_one_is_rejected() {
        let mut style = StyleConfig::default();
        assert_eq!(
            style.set_grey_style(false, 1.0),
            Err(UiError::InvalidGreyFactor(1.0))
        );
    }

    #[test]
    fn test_grey_factor_two_halves_channels() {
        let mut style = StyleConfig::default();
        style.set_grey_style(false, 2.0).unwrap();
        let rendered = style.render_color(Rgb888::new(200, 100, 50), false);
        assert_eq!(rendered, Rgb888::new(100, 50, 25));
    }

    #[test]
    fn test_enabled_color_passes_through() {
        let mut style = StyleConfig::default();
        style.set_grey_style(true, 4.0).unwrap();
        let base = Rgb888::new(200, 100, 50);
        assert_eq!(style.render_color(base, true), base);
    }
}
