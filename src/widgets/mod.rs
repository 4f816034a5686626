// src/widgets/mod.rs
//! Concrete widget enum and shared widget state
//!
//! Widget drawing is generic over [`Surface`], which makes a `Widget` trait
//! not object-safe; like the rest of the framework the registry therefore
//! stores a concrete enum. Displays render a value and never receive touch;
//! controls additionally participate in dispatch and own callback bindings.

pub mod button;
pub mod display;
pub mod group;
pub mod select;
pub mod slider;

pub use button::{Button, Checkbox, IconButton};
pub use display::{Dial, IconGauge, Label, Led, Meter};
pub use group::{ButtonList, IconRadioButtons, RadioButtons};
pub use select::{Dropdown, Listbox};
pub use slider::{HorizSlider, Knob, Slider};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::style::StyleConfig;
use crate::surface::Surface;
use crate::types::{GroupHook, Hook, TouchPoint, Value};

/// State shared by every widget: bounds, color overrides, flags.
#[derive(Debug)]
pub struct WidgetCore {
    pub(crate) bounds: Rectangle,
    pub(crate) fg: Option<Rgb888>,
    pub(crate) bg: Option<Rgb888>,
    pub(crate) font_color: Option<Rgb888>,
    pub(crate) visible: bool,
    pub(crate) greyed: bool,
    pub(crate) dirty: bool,
}

impl WidgetCore {
    pub(crate) fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            fg: None,
            bg: None,
            font_color: None,
            visible: true,
            greyed: false,
            dirty: true,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Foreground color after default resolution and grey transform.
    pub(crate) fn fg(&self, style: &StyleConfig) -> Rgb888 {
        style.render_color(self.fg.unwrap_or(style.fg), !self.greyed)
    }

    /// Background is cleared with, never greyed.
    pub(crate) fn bg(&self, style: &StyleConfig) -> Rgb888 {
        self.bg.unwrap_or(style.bg)
    }

    pub(crate) fn font(&self, style: &StyleConfig) -> Rgb888 {
        style.render_color(self.font_color.unwrap_or(style.font_color), !self.greyed)
    }

    pub(crate) fn contains(&self, p: TouchPoint) -> bool {
        self.bounds.contains(p.to_point())
    }
}

/// Builder methods shared by all widgets for per-instance color overrides.
pub trait Styled: Sized {
    fn core_mut(&mut self) -> &mut WidgetCore;

    fn with_fg(mut self, color: Rgb888) -> Self {
        self.core_mut().fg = Some(color);
        self
    }

    fn with_bg(mut self, color: Rgb888) -> Self {
        self.core_mut().bg = Some(color);
        self
    }

    fn with_font_color(mut self, color: Rgb888) -> Self {
        self.core_mut().font_color = Some(color);
        self
    }
}

/// Callback slots of the generic control state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HookSlot {
    /// Fired whenever the value changes (move-class)
    Change,
    /// Fired once on release (end-class)
    End,
    /// Fired once when a press crosses the long-press threshold
    LongPress,
}

/// A concrete, registry-friendly widget.
pub enum Widget {
    // Displays
    Label(Label),
    Led(Led),
    Meter(Meter),
    Dial(Dial),
    IconGauge(IconGauge),
    // Simple controls
    Button(Button),
    Checkbox(Checkbox),
    IconButton(IconButton),
    // Continuous controls
    Slider(Slider),
    HorizSlider(HorizSlider),
    Knob(Knob),
    // Selection controls
    Listbox(Listbox),
    Dropdown(Dropdown),
    // Grouped controls
    ButtonList(ButtonList),
    RadioButtons(RadioButtons),
    IconRadioButtons(IconRadioButtons),
}

macro_rules! impl_widget_from {
    ($($kind:ident),+ $(,)?) => {
        $(impl From<$kind> for Widget {
            fn from(w: $kind) -> Self {
                Widget::$kind(w)
            }
        })+
    };
}

impl_widget_from!(
    Label,
    Led,
    Meter,
    Dial,
    IconGauge,
    Button,
    Checkbox,
    IconButton,
    Slider,
    HorizSlider,
    Knob,
    Listbox,
    Dropdown,
    ButtonList,
    RadioButtons,
    IconRadioButtons,
);

impl Widget {
    pub fn core(&self) -> &WidgetCore {
        match self {
            Widget::Label(w) => &w.core,
            Widget::Led(w) => &w.core,
            Widget::Meter(w) => &w.core,
            Widget::Dial(w) => &w.core,
            Widget::IconGauge(w) => &w.core,
            Widget::Button(w) => &w.core,
            Widget::Checkbox(w) => &w.core,
            Widget::IconButton(w) => &w.core,
            Widget::Slider(w) => &w.core,
            Widget::HorizSlider(w) => &w.core,
            Widget::Knob(w) => &w.core,
            Widget::Listbox(w) => &w.core,
            Widget::Dropdown(w) => &w.core,
            Widget::ButtonList(w) => &w.core,
            Widget::RadioButtons(w) => &w.core,
            Widget::IconRadioButtons(w) => &w.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut WidgetCore {
        match self {
            Widget::Label(w) => &mut w.core,
            Widget::Led(w) => &mut w.core,
            Widget::Meter(w) => &mut w.core,
            Widget::Dial(w) => &mut w.core,
            Widget::IconGauge(w) => &mut w.core,
            Widget::Button(w) => &mut w.core,
            Widget::Checkbox(w) => &mut w.core,
            Widget::IconButton(w) => &mut w.core,
            Widget::Slider(w) => &mut w.core,
            Widget::HorizSlider(w) => &mut w.core,
            Widget::Knob(w) => &mut w.core,
            Widget::Listbox(w) => &mut w.core,
            Widget::Dropdown(w) => &mut w.core,
            Widget::ButtonList(w) => &mut w.core,
            Widget::RadioButtons(w) => &mut w.core,
            Widget::IconRadioButtons(w) => &mut w.core,
        }
    }

    /// Whether this widget participates in touch dispatch at all.
    pub fn is_control(&self) -> bool {
        !matches!(
            self,
            Widget::Label(_)
                | Widget::Led(_)
                | Widget::Meter(_)
                | Widget::Dial(_)
                | Widget::IconGauge(_)
        )
    }

    /// Hit region test; grouped controls consult their children.
    pub(crate) fn hit(&self, p: TouchPoint) -> bool {
        match self {
            Widget::ButtonList(g) => g
                .children
                .get(g.current)
                .is_some_and(|c| c.bounds.contains(p.to_point())),
            Widget::RadioButtons(g) => {
                g.children.iter().any(|c| c.bounds.contains(p.to_point()))
            }
            Widget::IconRadioButtons(g) => g.origins.iter().any(|o| {
                Rectangle::new(*o, g.icons.size()).contains(p.to_point())
            }),
            _ => self.core().contains(p),
        }
    }

    /// Current logical value, for kinds that have one.
    pub fn value(&self) -> Option<Value> {
        match self {
            Widget::Led(w) => Some(Value::Switch(w.on)),
            Widget::Meter(w) => Some(Value::Analog(w.value)),
            Widget::IconGauge(w) => Some(Value::Analog(w.value)),
            Widget::Checkbox(w) => Some(Value::Switch(w.checked)),
            Widget::IconButton(w) => Some(Value::Index(w.state)),
            Widget::Slider(w) => Some(Value::Analog(w.value)),
            Widget::HorizSlider(w) => Some(Value::Analog(w.value)),
            Widget::Knob(w) => Some(Value::Analog(w.value)),
            Widget::Listbox(w) => Some(Value::Index(w.selected)),
            Widget::Dropdown(w) => Some(Value::Index(w.selected)),
            Widget::ButtonList(w) => Some(Value::Index(w.current)),
            Widget::RadioButtons(w) => Some(Value::Index(w.current)),
            Widget::IconRadioButtons(w) => Some(Value::Index(w.current)),
            Widget::Label(_) | Widget::Dial(_) | Widget::Button(_) => None,
        }
    }

    pub(crate) fn draw<S: Surface>(
        &self,
        s: &mut S,
        style: &StyleConfig,
    ) -> Result<(), S::Error> {
        match self {
            Widget::Label(w) => w.draw(s, style),
            Widget::Led(w) => w.draw(s, style),
            Widget::Meter(w) => w.draw(s, style),
            Widget::Dial(w) => w.draw(s, style),
            Widget::IconGauge(w) => w.draw(s, style),
            Widget::Button(w) => w.draw(s, style),
            Widget::Checkbox(w) => w.draw(s, style),
            Widget::IconButton(w) => w.draw(s, style),
            Widget::Slider(w) => w.draw(s, style),
            Widget::HorizSlider(w) => w.draw(s, style),
            Widget::Knob(w) => w.draw(s, style),
            Widget::Listbox(w) => w.draw(s, style),
            Widget::Dropdown(w) => w.draw(s, style),
            Widget::ButtonList(w) => w.draw(s, style),
            Widget::RadioButtons(w) => w.draw(s, style),
            Widget::IconRadioButtons(w) => w.draw(s, style),
        }
    }

    /// Detaches a callback binding so it can run against `&mut Ui` without
    /// aliasing this widget; [`Widget::put_hook`] restores it afterwards.
    pub(crate) fn take_hook(&mut self, slot: HookSlot) -> Option<Hook> {
        match (self, slot) {
            (Widget::Checkbox(w), HookSlot::Change) => w.on_change.take(),
            (Widget::IconButton(w), HookSlot::Change) => w.on_change.take(),
            (Widget::Slider(w), HookSlot::Change) => w.on_move.take(),
            (Widget::HorizSlider(w), HookSlot::Change) => w.on_move.take(),
            (Widget::Knob(w), HookSlot::Change) => w.on_move.take(),
            (Widget::Listbox(w), HookSlot::Change) => w.on_select.take(),
            (Widget::Dropdown(w), HookSlot::Change) => w.on_select.take(),
            (Widget::Button(w), HookSlot::End) => w.on_release.take(),
            (Widget::Slider(w), HookSlot::End) => w.on_end.take(),
            (Widget::HorizSlider(w), HookSlot::End) => w.on_end.take(),
            (Widget::Knob(w), HookSlot::End) => w.on_end.take(),
            (Widget::Button(w), HookSlot::LongPress) => w.on_long.take(),
            _ => None,
        }
    }

    pub(crate) fn put_hook(&mut self, slot: HookSlot, hook: Hook) {
        let slot_ref = match (self, slot) {
            (Widget::Checkbox(w), HookSlot::Change) => &mut w.on_change,
            (Widget::IconButton(w), HookSlot::Change) => &mut w.on_change,
            (Widget::Slider(w), HookSlot::Change) => &mut w.on_move,
            (Widget::HorizSlider(w), HookSlot::Change) => &mut w.on_move,
            (Widget::Knob(w), HookSlot::Change) => &mut w.on_move,
            (Widget::Listbox(w), HookSlot::Change) => &mut w.on_select,
            (Widget::Dropdown(w), HookSlot::Change) => &mut w.on_select,
            (Widget::Button(w), HookSlot::End) => &mut w.on_release,
            (Widget::Slider(w), HookSlot::End) => &mut w.on_end,
            (Widget::HorizSlider(w), HookSlot::End) => &mut w.on_end,
            (Widget::Knob(w), HookSlot::End) => &mut w.on_end,
            (Widget::Button(w), HookSlot::LongPress) => &mut w.on_long,
            _ => return,
        };
        // A callback may have bound a replacement while detached; keep it.
        if slot_ref.is_none() {
            *slot_ref = Some(hook);
        }
    }

    pub(crate) fn take_group_hook(&mut self) -> Option<GroupHook> {
        match self {
            Widget::ButtonList(w) => w.on_select.take(),
            Widget::RadioButtons(w) => w.on_select.take(),
            Widget::IconRadioButtons(w) => w.on_select.take(),
            _ => None,
        }
    }

    pub(crate) fn put_group_hook(&mut self, hook: GroupHook) {
        let slot_ref = match self {
            Widget::ButtonList(w) => &mut w.on_select,
            Widget::RadioButtons(w) => &mut w.on_select,
            Widget::IconRadioButtons(w) => &mut w.on_select,
            _ => return,
        };
        if slot_ref.is_none() {
            *slot_ref = Some(hook);
        }
    }
}
