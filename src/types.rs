// src/types.rs
//! Core types shared across the framework

use alloc::boxed::Box;

use embedded_graphics::prelude::*;

use crate::engine::Ui;

/// A 2D touch point in absolute display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Filtered touch events produced by [`crate::touch::TouchFilter`].
///
/// A gesture is always delivered as `Down`, zero or more `Move`s, then `Up`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEvent {
    /// First stable coordinate after the panel reports pressure
    Down(TouchPoint),
    /// Stable coordinate changed while still pressed
    Move(TouchPoint),
    /// Pressure released; carries the last stable coordinate
    Up(TouchPoint),
}

/// Identifier of a screen on the stack.
///
/// Monotonic per [`Ui`]; never reused, so a stale id held by a timer or a
/// background task simply stops resolving once its screen is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenId(pub(crate) u32);

/// Handle to a widget: owning screen plus position in that screen's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId {
    pub(crate) screen: ScreenId,
    pub(crate) index: u16,
}

impl WidgetId {
    pub fn screen(&self) -> ScreenId {
        self.screen
    }
}

/// A widget's logical value, as read through [`Ui::value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// On/off controls and indicators (checkbox, LED)
    Switch(bool),
    /// Continuous controls in [0, 1] (sliders, knob, meter)
    Analog(f32),
    /// Discrete selections (listbox, dropdown, icon state, group current)
    Index(usize),
}

impl Value {
    pub fn as_switch(&self) -> Option<bool> {
        match self {
            Value::Switch(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_analog(&self) -> Option<f32> {
        match self {
            Value::Analog(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Value::Index(v) => Some(*v),
            _ => None,
        }
    }
}

/// A user callback bound to a control.
///
/// The boxed closure carries its fixed arguments by capture; the engine passes
/// the owning [`Ui`] and the control's id so the callback can read the value
/// back or drive other widgets through the public accessors.
pub type Hook = Box<dyn FnMut(&mut Ui, WidgetId)>;

/// Callback of a grouped control; the third argument is the index of the
/// child that just became current.
pub type GroupHook = Box<dyn FnMut(&mut Ui, WidgetId, usize)>;

/// Screen lifecycle callback (`on_open` / `on_hide`).
pub type ScreenHook = Box<dyn FnMut(&mut Ui)>;
