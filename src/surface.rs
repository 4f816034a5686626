// src/surface.rs
//! Drawing and touch collaborator traits
//!
//! The engine never draws pixels itself; it calls a [`Surface`]. All calls are
//! synchronous and immediate - no batching contract. [`EgSurface`] adapts any
//! `embedded-graphics` `DrawTarget` whose color converts from `Rgb888`.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle,
};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

use crate::touch::RawSample;

/// Descriptor of an icon strip: `count` frames of `width` x `height` pixels.
///
/// Icon pixel data is external; the surface resolves `id` to whatever bitmap
/// store the platform uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSet {
    pub id: u16,
    pub width: u32,
    pub height: u32,
    pub count: usize,
}

impl IconSet {
    pub fn new(id: u16, width: u32, height: u32, count: usize) -> Self {
        Self {
            id,
            width,
            height,
            count,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Where `draw_text` anchors the given position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    TopLeft,
    CenterLeft,
    Center,
}

/// Abstract drawing surface consumed by the engine.
pub trait Surface {
    type Error: core::fmt::Debug;

    fn fill_rect(&mut self, area: Rectangle, color: Rgb888) -> Result<(), Self::Error>;

    fn draw_rect(&mut self, area: Rectangle, color: Rgb888) -> Result<(), Self::Error>;

    /// Rectangle with visually clipped (rounded) corners, outline or filled.
    fn draw_clipped_rect(
        &mut self,
        area: Rectangle,
        color: Rgb888,
        filled: bool,
    ) -> Result<(), Self::Error>;

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb888) -> Result<(), Self::Error>;

    fn draw_circle(
        &mut self,
        center: Point,
        radius: u32,
        color: Rgb888,
        filled: bool,
    ) -> Result<(), Self::Error>;

    fn draw_text(
        &mut self,
        at: Point,
        text: &str,
        color: Rgb888,
        anchor: TextAnchor,
    ) -> Result<(), Self::Error>;

    /// Pixel extent of a string in the surface's UI font.
    fn text_extent(&self, text: &str) -> Size;

    /// Blits frame `state` of an icon set at `origin`.
    ///
    /// The default is a placeholder (bordered box, filled when `state > 0`)
    /// so platforms without bitmap support still get usable feedback.
    fn draw_icon(
        &mut self,
        origin: Point,
        icons: &IconSet,
        state: usize,
    ) -> Result<(), Self::Error> {
        let area = Rectangle::new(origin, icons.size());
        if state > 0 {
            self.fill_rect(area, Rgb888::new(180, 180, 180))?;
        }
        self.draw_rect(area, Rgb888::new(255, 255, 255))
    }
}

/// Source of raw touch samples, polled at a fixed rate.
pub trait TouchSource {
    /// Latest raw `(x, y, pressed)` sample from the panel.
    fn sample(&mut self) -> RawSample;
}

// ============================================================================
// embedded-graphics adapter
// ============================================================================

/// [`Surface`] implementation over an `embedded-graphics` `DrawTarget`.
///
/// Text uses the 6x10 mono font; clipped rectangles map to rounded corners.
pub struct EgSurface<D> {
    target: D,
}

impl<D> EgSurface<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

/// Corner radius used for `ClippedRect` shapes.
const CLIP_RADIUS: u32 = 8;

impl<D> Surface for EgSurface<D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
    D::Error: core::fmt::Debug,
{
    type Error = D::Error;

    fn fill_rect(&mut self, area: Rectangle, color: Rgb888) -> Result<(), Self::Error> {
        area.into_styled(PrimitiveStyle::with_fill(color.into()))
            .draw(&mut self.target)
    }

    fn draw_rect(&mut self, area: Rectangle, color: Rgb888) -> Result<(), Self::Error> {
        area.into_styled(PrimitiveStyle::with_stroke(color.into(), 1))
            .draw(&mut self.target)
    }

    fn draw_clipped_rect(
        &mut self,
        area: Rectangle,
        color: Rgb888,
        filled: bool,
    ) -> Result<(), Self::Error> {
        let style = if filled {
            PrimitiveStyle::with_fill(color.into())
        } else {
            PrimitiveStyle::with_stroke(color.into(), 1)
        };
        RoundedRectangle::with_equal_corners(area, Size::new(CLIP_RADIUS, CLIP_RADIUS))
            .into_styled(style)
            .draw(&mut self.target)
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Rgb888) -> Result<(), Self::Error> {
        Line::new(from, to)
            .into_styled(PrimitiveStyle::with_stroke(color.into(), 1))
            .draw(&mut self.target)
    }

    fn draw_circle(
        &mut self,
        center: Point,
        radius: u32,
        color: Rgb888,
        filled: bool,
    ) -> Result<(), Self::Error> {
        let style = if filled {
            PrimitiveStyle::with_fill(color.into())
        } else {
            PrimitiveStyle::with_stroke(color.into(), 1)
        };
        Circle::with_center(center, radius * 2)
            .into_styled(style)
            .draw(&mut self.target)
    }

    fn draw_text(
        &mut self,
        at: Point,
        text: &str,
        color: Rgb888,
        anchor: TextAnchor,
    ) -> Result<(), Self::Error> {
        let character_style = MonoTextStyle::new(&FONT_6X10, color.into());
        let text_style = match anchor {
            TextAnchor::TopLeft => TextStyleBuilder::new()
                .alignment(Alignment::Left)
                .baseline(Baseline::Top)
                .build(),
            TextAnchor::CenterLeft => TextStyleBuilder::new()
                .alignment(Alignment::Left)
                .baseline(Baseline::Middle)
                .build(),
            TextAnchor::Center => TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build(),
        };
        Text::with_text_style(text, at, character_style, text_style)
            .draw(&mut self.target)
            .map(|_| ())
    }

    fn text_extent(&self, text: &str) -> Size {
        let glyph = FONT_6X10.character_size;
        Size::new(glyph.width * text.chars().count() as u32, glyph.height)
    }
}
