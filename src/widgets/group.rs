// src/widgets/group.rs
//! Grouped controls: one aggregate widget owning several child buttons
//!
//! The aggregate is the source of truth: exactly one child is current at all
//! times, and only the aggregate fires a callback (once per change, with the
//! index of the child that just became current). Children never dispatch on
//! their own.

use alloc::vec::Vec;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::String as HeaplessString;

use crate::engine::Ui;
use crate::style::{Shape, StyleConfig};
use crate::surface::{IconSet, Surface, TextAnchor};
use crate::types::{GroupHook, TouchPoint, WidgetId};
use crate::widgets::{Styled, WidgetCore};

/// One child button of a grouped control.
pub(crate) struct GroupChild {
    pub(crate) bounds: Rectangle,
    pub(crate) text: HeaplessString<32>,
    pub(crate) shape: Shape,
    pub(crate) fg: Option<Rgb888>,
}

impl GroupChild {
    fn new(bounds: Rectangle, text: &str, shape: Shape) -> Self {
        let mut s = HeaplessString::new();
        s.push_str(text).ok();
        Self {
            bounds,
            text: s,
            shape,
            fg: None,
        }
    }

    fn draw<S: Surface>(
        &self,
        s: &mut S,
        core: &WidgetCore,
        style: &StyleConfig,
        body_override: Option<Rgb888>,
    ) -> Result<(), S::Error> {
        let base = body_override.or(self.fg).unwrap_or_else(|| core.fg.unwrap_or(style.fg));
        let body = style.render_color(base, !core.greyed);
        s.fill_rect(self.bounds, core.bg(style))?;
        match self.shape {
            Shape::Circle => {
                let radius = self.bounds.size.width.min(self.bounds.size.height) / 2;
                s.draw_circle(self.bounds.center(), radius, body, true)?;
            }
            Shape::Rectangle => s.fill_rect(self.bounds, body)?,
            Shape::ClippedRect => s.draw_clipped_rect(self.bounds, body, true)?,
        }
        if !self.text.is_empty() {
            s.draw_text(
                self.bounds.center(),
                &self.text,
                core.font(style),
                TextAnchor::Center,
            )?;
        }
        Ok(())
    }
}

fn union(a: Rectangle, b: Rectangle) -> Rectangle {
    if a.size == Size::zero() {
        return b;
    }
    let min_x = a.top_left.x.min(b.top_left.x);
    let min_y = a.top_left.y.min(b.top_left.y);
    let max_x = (a.top_left.x + a.size.width as i32).max(b.top_left.x + b.size.width as i32);
    let max_y = (a.top_left.y + a.size.height as i32).max(b.top_left.y + b.size.height as i32);
    Rectangle::new(
        Point::new(min_x, min_y),
        Size::new((max_x - min_x) as u32, (max_y - min_y) as u32),
    )
}

// ============================================================================
// ButtonList
// ============================================================================

/// Buttons stacked at (typically) the same location; only the current one is
/// shown, and pressing it advances to the next - a start/stop style toggle
/// or a short sequential pick.
pub struct ButtonList {
    pub(crate) core: WidgetCore,
    pub(crate) children: Vec<GroupChild>,
    pub(crate) current: usize,
    pub(crate) on_select: Option<GroupHook>,
}

impl ButtonList {
    pub fn new() -> Self {
        Self {
            core: WidgetCore::new(Rectangle::zero()),
            children: Vec::new(),
            current: 0,
            on_select: None,
        }
    }

    pub fn with_button(mut self, bounds: Rectangle, text: &str, shape: Shape) -> Self {
        self.core.bounds = union(self.core.bounds, bounds);
        self.children.push(GroupChild::new(bounds, text, shape));
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&mut Ui, WidgetId, usize) + 'static) -> Self {
        self.on_select = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        // Erase the union area: children may not perfectly overlap
        s.fill_rect(self.core.bounds, self.core.bg(style))?;
        if let Some(child) = self.children.get(self.current) {
            child.draw(s, &self.core, style, None)?;
        }
        Ok(())
    }
}

impl Default for ButtonList {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled for ButtonList {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// RadioButtons
// ============================================================================

/// Buttons at distinct locations; the current one renders in the highlight
/// color.
pub struct RadioButtons {
    pub(crate) core: WidgetCore,
    pub(crate) children: Vec<GroupChild>,
    pub(crate) current: usize,
    highlight: Rgb888,
    pub(crate) on_select: Option<GroupHook>,
}

impl RadioButtons {
    pub fn new(highlight: Rgb888) -> Self {
        Self {
            core: WidgetCore::new(Rectangle::zero()),
            children: Vec::new(),
            current: 0,
            highlight,
            on_select: None,
        }
    }

    pub fn with_button(mut self, bounds: Rectangle, text: &str, shape: Shape) -> Self {
        self.core.bounds = union(self.core.bounds, bounds);
        self.children.push(GroupChild::new(bounds, text, shape));
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&mut Ui, WidgetId, usize) + 'static) -> Self {
        self.on_select = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child under a touch coordinate.
    pub(crate) fn child_at(&self, p: TouchPoint) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.bounds.contains(p.to_point()))
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        for (i, child) in self.children.iter().enumerate() {
            let body = (i == self.current).then_some(self.highlight);
            child.draw(s, &self.core, style, body)?;
        }
        Ok(())
    }
}

impl Styled for RadioButtons {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// IconRadioButtons
// ============================================================================

/// Radio group rendered from a shared icon strip: the current child shows
/// frame 1, all others frame 0.
pub struct IconRadioButtons {
    pub(crate) core: WidgetCore,
    pub(crate) icons: IconSet,
    pub(crate) origins: Vec<Point>,
    pub(crate) current: usize,
    pub(crate) on_select: Option<GroupHook>,
}

impl IconRadioButtons {
    pub fn new(icons: IconSet) -> Self {
        Self {
            core: WidgetCore::new(Rectangle::zero()),
            icons,
            origins: Vec::new(),
            current: 0,
            on_select: None,
        }
    }

    pub fn with_button(mut self, origin: Point) -> Self {
        self.core.bounds = union(self.core.bounds, Rectangle::new(origin, self.icons.size()));
        self.origins.push(origin);
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&mut Ui, WidgetId, usize) + 'static) -> Self {
        self.on_select = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub(crate) fn child_at(&self, p: TouchPoint) -> Option<usize> {
        self.origins
            .iter()
            .position(|o| Rectangle::new(*o, self.icons.size()).contains(p.to_point()))
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, _style: &StyleConfig) -> Result<(), S::Error> {
        for (i, origin) in self.origins.iter().enumerate() {
            let state = usize::from(i == self.current);
            s.draw_icon(*origin, &self.icons, state)?;
        }
        Ok(())
    }
}

impl Styled for IconRadioButtons {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}
