// src/widgets/display.rs
//! Display widgets: render a value, never receive touch

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String as HeaplessString;
use libm::{cosf, sinf};

use crate::color;
use crate::style::StyleConfig;
use crate::surface::{IconSet, Surface, TextAnchor};
use crate::widgets::{Styled, WidgetCore};

/// Height of a single-line text widget: font plus a little padding.
pub const LABEL_HEIGHT: u32 = 14;

// ============================================================================
// Label
// ============================================================================

/// Single line of text, refreshed through [`crate::Ui::set_text`].
pub struct Label {
    pub(crate) core: WidgetCore,
    pub(crate) text: HeaplessString<32>,
    border: bool,
}

impl Label {
    pub fn new(top_left: Point, width: u32, text: &str) -> Self {
        let mut s = HeaplessString::new();
        s.push_str(text).ok();
        Self {
            core: WidgetCore::new(Rectangle::new(top_left, Size::new(width, LABEL_HEIGHT))),
            text: s,
            border: false,
        }
    }

    pub fn with_border(mut self) -> Self {
        self.border = true;
        self
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        s.fill_rect(b, self.core.bg(style))?;
        if self.border {
            s.draw_rect(b, self.core.fg(style))?;
        }
        let at = Point::new(b.top_left.x + 3, b.top_left.y + b.size.height as i32 / 2);
        s.draw_text(at, &self.text, self.core.font(style), TextAnchor::CenterLeft)
    }
}

impl Styled for Label {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Led
// ============================================================================

/// Round indicator, on/off with a settable lit color.
pub struct Led {
    pub(crate) core: WidgetCore,
    pub(crate) on: bool,
    color: Rgb888,
}

impl Led {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            on: false,
            color: color::RED,
        }
    }

    pub fn with_color(mut self, color: Rgb888) -> Self {
        self.color = color;
        self
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        s.fill_rect(b, self.core.bg(style))?;
        let radius = b.size.width.min(b.size.height) / 2 - 1;
        let fill = if self.on {
            style.render_color(self.color, !self.core.greyed)
        } else {
            color::BLACK
        };
        s.draw_circle(b.center(), radius, fill, true)?;
        s.draw_circle(b.center(), radius, self.core.fg(style), false)
    }
}

impl Styled for Led {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Meter
// ============================================================================

/// Vertical bar meter displaying an analog value in [0, 1].
///
/// Writes go through [`crate::Ui::set_analog`] and clamp like any continuous
/// control; a meter has no callbacks.
pub struct Meter {
    pub(crate) core: WidgetCore,
    pub(crate) value: f32,
    divisions: u32,
    legends: Vec<HeaplessString<8>>,
    pointer_color: Option<Rgb888>,
}

impl Meter {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            value: 0.0,
            divisions: 10,
            legends: Vec::new(),
            pointer_color: None,
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

    pub fn with_legends(mut self, legends: &[&str]) -> Self {
        self.legends = legends
            .iter()
            .map(|l| {
                let mut s = HeaplessString::new();
                s.push_str(l).ok();
                s
            })
            .collect();
        self
    }

    pub fn with_pointer_color(mut self, color: Rgb888) -> Self {
        self.pointer_color = Some(color);
        self
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;
        s.draw_rect(b, fg)?;

        let x0 = b.top_left.x;
        let x1 = x0 + b.size.width as i32 - 1;
        let y0 = b.top_left.y + 2;
        let y1 = b.top_left.y + b.size.height as i32 - 3;
        let height = (y1 - y0) as f32;

        if self.divisions > 0 {
            let dy = height / self.divisions as f32;
            for tick in 0..=self.divisions {
                let y = y0 + (dy * tick as f32) as i32;
                s.draw_line(Point::new(x0 + 1, y), Point::new(x0 + 5, y), fg)?;
                s.draw_line(Point::new(x1 - 5, y), Point::new(x1 - 1, y), fg)?;
            }
        }

        if self.legends.len() > 1 {
            let dy = height / (self.legends.len() - 1) as f32;
            let cx = x0 + b.size.width as i32 / 2;
            for (i, legend) in self.legends.iter().enumerate() {
                let y = y1 - (dy * i as f32) as i32;
                s.draw_text(Point::new(cx, y), legend, self.core.font(style), TextAnchor::Center)?;
            }
        }

        let pointer_y = y1 - (self.value * height) as i32;
        let pointer = style.render_color(
            self.pointer_color.unwrap_or_else(|| self.core.fg.unwrap_or(style.fg)),
            !self.core.greyed,
        );
        s.draw_line(Point::new(x0 + 1, pointer_y), Point::new(x1 - 1, pointer_y), pointer)
    }
}

impl Styled for Meter {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Dial
// ============================================================================

/// One hand of a dial: relative length and current angle, if ever shown.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DialPointer {
    pub(crate) len: f32,
    pub(crate) angle: Option<f32>,
}

/// Analog dial with one or more pointers.
///
/// Angle 0 is vertical; positive angles are clockwise, in radians. Pointers
/// are addressed by index through [`crate::Ui::set_dial`]; an index beyond
/// the configured count is a configuration error.
pub struct Dial {
    pub(crate) core: WidgetCore,
    pub(crate) pointers: Vec<DialPointer>,
    ticks: u32,
}

impl Dial {
    pub fn new(top_left: Point, height: u32) -> Self {
        Self {
            core: WidgetCore::new(Rectangle::new(top_left, Size::new(height, height))),
            pointers: alloc::vec![DialPointer {
                len: 0.9,
                angle: None,
            }],
            ticks: 4,
        }
    }

    /// Replaces the pointer set; each entry is a hand length relative to the
    /// dial radius.
    pub fn with_pointers(mut self, lens: &[f32]) -> Self {
        self.pointers = lens
            .iter()
            .map(|&len| DialPointer { len, angle: None })
            .collect();
        self
    }

    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;

        let radius = b.size.height as f32 / 2.0 - 2.0;
        let center = b.center();
        let tick_len = 0.1 * radius;
        for tick in 0..self.ticks {
            let theta = 2.0 * core::f32::consts::PI * tick as f32 / self.ticks as f32;
            let start = radial(center, radius, theta);
            let end = radial(center, radius - tick_len, theta);
            s.draw_line(start, end, fg)?;
        }
        s.draw_circle(center, radius as u32, fg, false)?;

        for pointer in &self.pointers {
            if let Some(angle) = pointer.angle {
                let end = radial(center, pointer.len * radius, angle);
                s.draw_line(center, end, fg)?;
            }
        }
        Ok(())
    }
}

impl Styled for Dial {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

/// Point at `length` from `center` under `angle` (0 = up, clockwise).
pub(crate) fn radial(center: Point, length: f32, angle: f32) -> Point {
    Point::new(
        center.x + (length * sinf(angle)) as i32,
        center.y - (length * cosf(angle)) as i32,
    )
}

// ============================================================================
// IconGauge
// ============================================================================

/// Gauge rendered as one frame of an icon strip, driven by an analog value.
pub struct IconGauge {
    pub(crate) core: WidgetCore,
    pub(crate) icons: IconSet,
    pub(crate) state: usize,
    pub(crate) value: f32,
}

impl IconGauge {
    pub fn new(origin: Point, icons: IconSet) -> Self {
        Self {
            core: WidgetCore::new(Rectangle::new(origin, icons.size())),
            icons,
            state: 0,
            value: 0.0,
        }
    }

    pub fn icon_count(&self) -> usize {
        self.icons.count
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, _style: &StyleConfig) -> Result<(), S::Error> {
        s.draw_icon(self.core.bounds.top_left, &self.icons, self.state)
    }
}

impl Styled for IconGauge {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}
