// src/widgets/slider.rs
//! Continuous controls: sliders and the rotary knob
//!
//! All three hold an analog value in [0, 1], clamp out-of-range writes, fire
//! a move-class callback on every change and an end-class callback on
//! release. Only the coordinate-to-value mapping differs per kind.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String as HeaplessString;
use libm::atan2f;

use crate::engine::Ui;
use crate::style::StyleConfig;
use crate::surface::{Surface, TextAnchor};
use crate::types::{Hook, TouchPoint, WidgetId};
use crate::widgets::display::radial;
use crate::widgets::{Styled, WidgetCore};

const TWO_PI: f32 = 2.0 * core::f32::consts::PI;

/// Thickness of a slider handle in pixels.
const HANDLE: i32 = 6;

fn legend_strings(legends: &[&str]) -> Vec<HeaplessString<8>> {
    legends
        .iter()
        .map(|l| {
            let mut s = HeaplessString::new();
            s.push_str(l).ok();
            s
        })
        .collect()
}

// ============================================================================
// Slider (vertical)
// ============================================================================

/// Vertical slider; the touch y coordinate maps linearly onto [0, 1],
/// bottom = 0.
pub struct Slider {
    pub(crate) core: WidgetCore,
    pub(crate) value: f32,
    divisions: u32,
    legends: Vec<HeaplessString<8>>,
    slide_color: Option<Rgb888>,
    pub(crate) on_move: Option<Hook>,
    pub(crate) on_end: Option<Hook>,
}

impl Slider {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            value: 0.0,
            divisions: 10,
            legends: Vec::new(),
            slide_color: None,
            on_move: None,
            on_end: None,
        }
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_divisions(mut self, divisions: u32) -> Self {
        self.divisions = divisions;
        self
    }

    /// Legend texts, bottom to top, drawn right of the slot.
    pub fn with_legends(mut self, legends: &[&str]) -> Self {
        self.legends = legend_strings(legends);
        self
    }

    pub fn with_slide_color(mut self, color: Rgb888) -> Self {
        self.slide_color = Some(color);
        self
    }

    pub fn on_move(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_move = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn on_end(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_end = Some(alloc::boxed::Box::new(hook));
        self
    }

    /// Maps a touch coordinate onto the value domain. Capture persists while
    /// dragging, so the coordinate may lie well outside the bounds; the
    /// result is clamped like any analog write.
    pub(crate) fn ratio_at(&self, p: TouchPoint) -> f32 {
        let b = self.core.bounds;
        let bottom = b.top_left.y + b.size.height as i32;
        (bottom - p.y as i32) as f32 / b.size.height as f32
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;

        let w = b.size.width as i32;
        let y0 = b.top_left.y + HANDLE / 2;
        let y1 = b.top_left.y + b.size.height as i32 - HANDLE / 2;
        let height = (y1 - y0) as f32;
        let dx = w / 3;
        let slot = Rectangle::new(
            Point::new(b.top_left.x + dx, y0),
            Size::new(dx as u32, (y1 - y0) as u32),
        );
        s.draw_rect(slot, fg)?;

        if self.divisions > 0 {
            let dy = height / self.divisions as f32;
            for tick in 0..=self.divisions {
                let y = y0 + (dy * tick as f32) as i32;
                let x = b.top_left.x;
                s.draw_line(Point::new(x, y), Point::new(x + dx - 1, y), fg)?;
                s.draw_line(Point::new(x + 2 * dx + 1, y), Point::new(x + w - 1, y), fg)?;
            }
        }

        if self.legends.len() > 1 {
            let dy = height / (self.legends.len() - 1) as f32;
            let x = b.top_left.x + w + 3;
            for (i, legend) in self.legends.iter().enumerate() {
                let y = y1 - (dy * i as f32) as i32;
                s.draw_text(Point::new(x, y), legend, self.core.font(style), TextAnchor::CenterLeft)?;
            }
        }

        let handle_y = y1 - (self.value * height) as i32;
        let handle = Rectangle::new(
            Point::new(b.top_left.x + w / 10, handle_y - HANDLE / 2),
            Size::new((w * 4 / 5) as u32, HANDLE as u32),
        );
        let color = style.render_color(
            self.slide_color.unwrap_or_else(|| self.core.fg.unwrap_or(style.fg)),
            !self.core.greyed,
        );
        s.fill_rect(handle, color)
    }
}

impl Styled for Slider {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// HorizSlider
// ============================================================================

/// Horizontal slider; the touch x coordinate maps onto [0, 1], left = 0.
pub struct HorizSlider {
    pub(crate) core: WidgetCore,
    pub(crate) value: f32,
    divisions: u32,
    legends: Vec<HeaplessString<8>>,
    slide_color: Option<Rgb888>,
    pub(crate) on_move: Option<Hook>,
    pub(crate) on_end: Option<Hook>,
}

impl HorizSlider {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            value: 0.0,
            divisions: 10,
            legends: Vec::new(),
            slide_color: None,
            on_move: None,
            on_end: None,
        }
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value.clamp(0.0, 1.0);
        self
    }

    pub fn with_divisions(mut self, divisions: u32) -> Self {
        self.divisions = divisions;
        self
    }

    /// Legend texts, left to right, drawn above the slot.
    pub fn with_legends(mut self, legends: &[&str]) -> Self {
        self.legends = legend_strings(legends);
        self
    }

    pub fn with_slide_color(mut self, color: Rgb888) -> Self {
        self.slide_color = Some(color);
        self
    }

    pub fn on_move(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_move = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn on_end(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_end = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub(crate) fn ratio_at(&self, p: TouchPoint) -> f32 {
        let b = self.core.bounds;
        (p.x as i32 - b.top_left.x) as f32 / b.size.width as f32
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;

        let h = b.size.height as i32;
        let x0 = b.top_left.x + HANDLE / 2;
        let x1 = b.top_left.x + b.size.width as i32 - HANDLE / 2;
        let width = (x1 - x0) as f32;
        let dy = h / 3;
        let slot = Rectangle::new(
            Point::new(x0, b.top_left.y + dy),
            Size::new((x1 - x0) as u32, dy as u32),
        );
        s.draw_rect(slot, fg)?;

        if self.divisions > 0 {
            let dx = width / self.divisions as f32;
            for tick in 0..=self.divisions {
                let x = x0 + (dx * tick as f32) as i32;
                let y = b.top_left.y;
                s.draw_line(Point::new(x, y), Point::new(x, y + dy - 1), fg)?;
                s.draw_line(Point::new(x, y + 2 * dy + 1), Point::new(x, y + h - 1), fg)?;
            }
        }

        if self.legends.len() > 1 {
            let dx = width / (self.legends.len() - 1) as f32;
            let y = b.top_left.y - 6;
            for (i, legend) in self.legends.iter().enumerate() {
                let x = x0 + (dx * i as f32) as i32;
                s.draw_text(Point::new(x, y), legend, self.core.font(style), TextAnchor::Center)?;
            }
        }

        let handle_x = x0 + (self.value * width) as i32;
        let handle = Rectangle::new(
            Point::new(handle_x - HANDLE / 2, b.top_left.y + h / 10),
            Size::new(HANDLE as u32, (h * 4 / 5) as u32),
        );
        let color = style.render_color(
            self.slide_color.unwrap_or_else(|| self.core.fg.unwrap_or(style.fg)),
            !self.core.greyed,
        );
        s.fill_rect(handle, color)
    }
}

impl Styled for HorizSlider {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Knob
// ============================================================================

/// Rotary control covering `arc` radians of travel, centered on vertical.
pub struct Knob {
    pub(crate) core: WidgetCore,
    pub(crate) value: f32,
    arc: f32,
    ticks: u32,
    color: Option<Rgb888>,
    pub(crate) on_move: Option<Hook>,
    pub(crate) on_end: Option<Hook>,
}

impl Knob {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            value: 0.0,
            arc: TWO_PI,
            ticks: 9,
            color: None,
            on_move: None,
            on_end: None,
        }
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value.clamp(0.0, 1.0);
        self
    }

    /// Usable angle of travel in radians, clamped to (0, 2*pi].
    pub fn with_arc(mut self, arc: f32) -> Self {
        self.arc = arc.clamp(0.1, TWO_PI);
        self
    }

    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks.max(2);
        self
    }

    /// Fill color of the knob body.
    pub fn with_color(mut self, color: Rgb888) -> Self {
        self.color = Some(color);
        self
    }

    pub fn on_move(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_move = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn on_end(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_end = Some(alloc::boxed::Box::new(hook));
        self
    }

    /// Angle of the touch vector relative to vertical, mapped onto [0, 1].
    ///
    /// Returns `None` inside the dead zone around the center where the
    /// vector is too short to give a meaningful angle.
    pub(crate) fn ratio_at(&self, p: TouchPoint) -> Option<f32> {
        let b = self.core.bounds;
        let center = b.center();
        let radius = b.size.height as f32 / 2.0;
        let dx = p.x as i32 - center.x;
        let dy = center.y - p.y as i32;
        if ((dx * dx + dy * dy) as f32) < radius * radius * 0.5 {
            return None;
        }
        let alpha = atan2f(dx as f32, dy as f32);
        let half = self.arc / 2.0;
        Some((alpha.clamp(-half, half) + half) / self.arc)
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;

        let radius = b.size.height as f32 / 2.0 - 2.0;
        let center = b.center();
        let tick_len = 0.1 * radius;
        for tick in 0..self.ticks {
            let theta = (tick as f32 / (self.ticks - 1) as f32) * self.arc - self.arc / 2.0;
            let start = radial(center, radius, theta);
            let end = radial(center, radius - tick_len, theta);
            s.draw_line(start, end, fg)?;
        }

        let body = radius - tick_len;
        if let Some(color) = self.color {
            s.draw_circle(center, body as u32, style.render_color(color, !self.core.greyed), true)?;
        }
        s.draw_circle(center, body as u32, fg, false)?;
        s.draw_circle(center, (body - 3.0) as u32, fg, false)?;

        let angle = self.value * self.arc - self.arc / 2.0;
        let pointer_len = radius - tick_len - 5.0;
        s.draw_line(center, radial(center, pointer_len, angle), fg)
    }
}

impl Styled for Knob {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}
