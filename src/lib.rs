// src/lib.rs
//! Tactile UI - a touch-driven widget framework for small embedded displays
//!
//! This crate provides the interaction engine for resistive/capacitive touch
//! panels driving TFT-class displays:
//! - Touch-sample filtering (debounce/denoise of raw panel samples)
//! - A screen stack with modal sub-window (aperture) support
//! - Hit-testing and gesture capture dispatch
//! - A shared control state machine (press, long-press, value, callbacks)
//! - A process-wide disabled-rendering (grey) style
//!
//! Drawing and raw touch acquisition stay behind the [`surface::Surface`] and
//! [`surface::TouchSource`] traits; an `embedded-graphics` adapter is provided
//! for any `DrawTarget` whose color converts from `Rgb888`.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod color;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod screen;
pub mod style;
pub mod surface;
pub mod touch;
pub mod types;
pub mod widgets;

// Re-export commonly used items
pub use engine::Ui;
pub use error::UiError;
pub use screen::{Screen, ScreenKind};
pub use style::{Shape, StyleConfig};
pub use surface::{EgSurface, IconSet, Surface, TextAnchor, TouchSource};
pub use touch::{RawSample, TouchConfig, TouchFilter};
pub use types::{ScreenId, TouchEvent, TouchPoint, Value, WidgetId};
pub use widgets::{
    Button, ButtonList, Checkbox, Dial, Dropdown, HorizSlider, IconButton, IconGauge,
    IconRadioButtons, Knob, Label, Led, Listbox, Meter, RadioButtons, Slider, Styled, Widget,
};
