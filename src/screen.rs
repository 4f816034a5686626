// src/screen.rs
//! Screens and their widget registries
//!
//! A screen owns an ordered collection of widgets; the order is construction
//! order and doubles as paint order (ascending) and hit-test priority
//! (descending, so the visually topmost widget wins). Screens live on the
//! [`crate::engine::Ui`] stack; only the top of the stack receives touch and
//! is rendered.

use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::engine::Ui;
use crate::types::{ScreenHook, ScreenId, Value, WidgetId};
use crate::widgets::Widget;

/// Full-display screen, or a modal sub-window bound to a display rectangle.
///
/// While an aperture is on top of the stack it captures all touch: events
/// outside its region are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Full,
    Aperture(Rectangle),
}

pub struct Screen {
    id: ScreenId,
    kind: ScreenKind,
    widgets: Vec<Widget>,
    pub(crate) open_hook: Option<ScreenHook>,
    pub(crate) hide_hook: Option<ScreenHook>,
    pub(crate) result: Option<Value>,
}

impl Screen {
    pub(crate) fn new(id: ScreenId, kind: ScreenKind) -> Self {
        Self {
            id,
            kind,
            widgets: Vec::new(),
            open_hook: None,
            hide_hook: None,
            result: None,
        }
    }

    pub fn id(&self) -> ScreenId {
        self.id
    }

    pub fn kind(&self) -> ScreenKind {
        self.kind
    }

    pub fn is_modal(&self) -> bool {
        matches!(self.kind, ScreenKind::Aperture(_))
    }

    /// The display region this screen owns.
    pub fn region(&self, display_size: Size) -> Rectangle {
        match self.kind {
            ScreenKind::Full => Rectangle::new(Point::zero(), display_size),
            ScreenKind::Aperture(r) => r,
        }
    }

    /// Appends a widget; later widgets draw on top and hit-test first.
    ///
    /// The registry is append-only: a widget belongs to this screen for the
    /// screen's whole lifetime and is dropped with it.
    pub fn add(&mut self, widget: impl Into<Widget>) -> WidgetId {
        self.widgets.push(widget.into());
        WidgetId {
            screen: self.id,
            index: (self.widgets.len() - 1) as u16,
        }
    }

    /// Called when this screen becomes the active top of the stack.
    pub fn on_open(&mut self, hook: impl FnMut(&mut Ui) + 'static) {
        self.open_hook = Some(alloc::boxed::Box::new(hook));
    }

    /// Called when this screen stops being the active top (hidden or popped).
    pub fn on_hide(&mut self, hook: impl FnMut(&mut Ui) + 'static) {
        self.hide_hook = Some(alloc::boxed::Box::new(hook));
    }

    /// Sets the value handed back to the invoking screen when this (modal)
    /// screen is popped; read it via [`Ui::modal_result`].
    pub fn set_result(&mut self, value: Value) {
        self.result = Some(value);
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub(crate) fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub(crate) fn widgets_mut(&mut self) -> &mut [Widget] {
        &mut self.widgets
    }

    pub(crate) fn widget(&self, index: u16) -> Option<&Widget> {
        self.widgets.get(index as usize)
    }

    pub(crate) fn widget_mut(&mut self, index: u16) -> Option<&mut Widget> {
        self.widgets.get_mut(index as usize)
    }
}
