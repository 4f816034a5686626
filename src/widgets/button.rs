// src/widgets/button.rs
//! Pushbutton-style controls

use embassy_time::{Duration, Instant};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String as HeaplessString;

use crate::engine::Ui;
use crate::error::UiError;
use crate::style::{Shape, StyleConfig};
use crate::surface::{IconSet, Surface, TextAnchor};
use crate::types::{Hook, WidgetId};
use crate::widgets::{Styled, WidgetCore};

// ============================================================================
// Button
// ============================================================================

/// Momentary pushbutton.
///
/// The release callback fires when the finger lifts before the long-press
/// threshold; the long-press callback fires once when the threshold is
/// crossed while still pressed. The two are mutually exclusive per gesture.
/// A `lit_color` gives momentary visual feedback on press and auto-reverts;
/// it never alters logical state.
pub struct Button {
    pub(crate) core: WidgetCore,
    text: HeaplessString<32>,
    shape: Shape,
    filled: bool,
    pub(crate) lit_color: Option<Rgb888>,
    pub(crate) lit_until: Option<Instant>,
    pub(crate) on_release: Option<Hook>,
    pub(crate) on_long: Option<Hook>,
    pub(crate) long_press_after: Option<Duration>,
}

impl Button {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            text: HeaplessString::new(),
            shape: Shape::Rectangle,
            filled: true,
            lit_color: None,
            lit_until: None,
            on_release: None,
            on_long: None,
            long_press_after: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text.clear();
        self.text.push_str(text).ok();
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Outline only instead of a filled body.
    pub fn outline(mut self) -> Self {
        self.filled = false;
        self
    }

    pub fn with_lit_color(mut self, color: Rgb888) -> Self {
        self.lit_color = Some(color);
        self
    }

    pub fn on_release(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_release = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn on_long_press(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_long = Some(alloc::boxed::Box::new(hook));
        self
    }

    /// Overrides the process-wide long-press threshold for this button.
    pub fn with_long_press_time(mut self, threshold: Duration) -> Self {
        self.long_press_after = Some(threshold);
        self
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        s.fill_rect(b, self.core.bg(style))?;
        let body = match self.lit_until {
            Some(_) => self.lit_color.unwrap_or_else(|| self.core.fg(style)),
            None => self.core.fg(style),
        };
        match self.shape {
            Shape::Circle => {
                let radius = b.size.width.min(b.size.height) / 2;
                s.draw_circle(b.center(), radius, body, self.filled)?;
            }
            Shape::Rectangle => {
                if self.filled {
                    s.fill_rect(b, body)?;
                } else {
                    s.draw_rect(b, body)?;
                }
            }
            Shape::ClippedRect => {
                s.draw_clipped_rect(b, body, self.filled)?;
            }
        }
        if !self.text.is_empty() {
            s.draw_text(b.center(), &self.text, self.core.font(style), TextAnchor::Center)?;
        }
        Ok(())
    }
}

impl Styled for Button {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Checkbox
// ============================================================================

/// Two-state toggle; flips on touch-down and fires its change callback.
pub struct Checkbox {
    pub(crate) core: WidgetCore,
    pub(crate) checked: bool,
    fill_color: Option<Rgb888>,
    pub(crate) on_change: Option<Hook>,
}

impl Checkbox {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            checked: false,
            fill_color: None,
            on_change: None,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Filled square instead of a cross when checked.
    pub fn with_fill_color(mut self, color: Rgb888) -> Self {
        self.fill_color = Some(color);
        self
    }

    pub fn on_change(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_change = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;

        let side = b.size.width.min(b.size.height);
        let box_area = Rectangle::new(b.top_left, Size::new(side, side));
        if self.checked {
            if let Some(fill) = self.fill_color {
                s.fill_rect(box_area, style.render_color(fill, !self.core.greyed))?;
            } else {
                let br = Point::new(
                    b.top_left.x + side as i32 - 1,
                    b.top_left.y + side as i32 - 1,
                );
                let tr = Point::new(b.top_left.x + side as i32 - 1, b.top_left.y);
                let bl = Point::new(b.top_left.x, b.top_left.y + side as i32 - 1);
                s.draw_line(b.top_left, br, fg)?;
                s.draw_line(bl, tr, fg)?;
            }
        }
        s.draw_rect(box_area, fg)
    }
}

impl Styled for Checkbox {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// IconButton
// ============================================================================

/// Button rendered from an icon strip.
///
/// Either *toggling* (press advances the frame cyclically) or *flashing*
/// (press shows frame 1 momentarily, then reverts to frame 0). The change
/// callback fires on every press and on every externally driven state change.
pub struct IconButton {
    pub(crate) core: WidgetCore,
    pub(crate) icons: IconSet,
    pub(crate) state: usize,
    pub(crate) toggle: bool,
    pub(crate) flash: Option<Duration>,
    pub(crate) flash_until: Option<Instant>,
    pub(crate) on_change: Option<Hook>,
}

impl IconButton {
    pub fn new(origin: Point, icons: IconSet) -> Self {
        Self {
            core: WidgetCore::new(Rectangle::new(origin, icons.size())),
            icons,
            state: 0,
            toggle: false,
            flash: None,
            flash_until: None,
            on_change: None,
        }
    }

    pub fn toggling(mut self) -> Self {
        self.toggle = true;
        self
    }

    /// Momentary feedback: frame 1 on press, back to frame 0 after `hold`.
    pub fn flashing(mut self, hold: Duration) -> Result<Self, UiError> {
        if self.icons.count < 2 {
            return Err(UiError::FlashNeedsTwoFrames);
        }
        self.flash = Some(hold);
        Ok(self)
    }

    pub fn with_state(mut self, state: usize) -> Result<Self, UiError> {
        if state >= self.icons.count {
            return Err(UiError::IconStateOutOfRange {
                state,
                count: self.icons.count,
            });
        }
        self.state = state;
        Ok(self)
    }

    pub fn on_change(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_change = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn icon_count(&self) -> usize {
        self.icons.count
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, _style: &StyleConfig) -> Result<(), S::Error> {
        s.draw_icon(self.core.bounds.top_left, &self.icons, self.state)
    }
}

impl Styled for IconButton {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}
