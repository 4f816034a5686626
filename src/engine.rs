// src/engine.rs
//! The interaction engine
//!
//! [`Ui`] owns the screen stack and drives everything between a filtered
//! touch event and a user callback: hit-testing, gesture capture, the shared
//! control state machine (value writes, long press, lit feedback) and
//! dirty-region redraw. One filtered event is processed to completion -
//! including any callback - before the next poll tick, so callbacks always
//! run with exclusive access to widget state.

use alloc::vec::Vec;

use embassy_time::Instant;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use log::{debug, warn};

use crate::error::UiError;
use crate::screen::{Screen, ScreenKind};
use crate::style::StyleConfig;
use crate::surface::Surface;
use crate::touch::{RawSample, TouchConfig, TouchFilter};
use crate::types::{ScreenId, TouchEvent, TouchPoint, Value, WidgetId};
use crate::widgets::select::{Listbox, ROW_HEIGHT};
use crate::widgets::{HookSlot, Widget};

/// An in-progress gesture bound to one control.
///
/// Capture persists until release even when the coordinate leaves the
/// control's bounds - that is what makes slider/knob dragging feel physical.
#[derive(Debug, Clone, Copy)]
struct Capture {
    id: WidgetId,
    start: Instant,
    long_fired: bool,
}

/// What a touch-down on a control translates into.
enum Press {
    Nothing,
    /// Fire the change callback without touching the value
    Fire,
    Analog(f32),
    Switch(bool),
    /// Discrete selection by index
    Select(usize),
    /// Listbox row tap: selects, and reports even when unchanged
    ListRow(usize),
    OpenDropdown,
}

pub struct Ui {
    display_size: Size,
    style: StyleConfig,
    filter: TouchFilter,
    screens: Vec<Screen>,
    next_screen: u32,
    capture: Option<Capture>,
    full_redraw: bool,
    modal_result: Option<Value>,
}

impl Ui {
    pub fn new(display_size: Size, touch: TouchConfig) -> Self {
        Self {
            display_size,
            style: StyleConfig::default(),
            filter: TouchFilter::new(touch),
            screens: Vec::new(),
            next_screen: 0,
            capture: None,
            full_redraw: false,
            modal_result: None,
        }
    }

    pub fn display_size(&self) -> Size {
        self.display_size
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleConfig {
        &mut self.style
    }

    /// Process-wide disabled-rendering parameters; `factor` must exceed 1.
    pub fn set_grey_style(&mut self, desaturate: bool, factor: f32) -> Result<(), UiError> {
        self.style.set_grey_style(desaturate, factor)
    }

    // ========================================================================
    // Screen stack
    // ========================================================================

    /// Pushes a new full screen built by `build` (construction is deferred to
    /// this call to bound memory), hides the previous top, opens the new one
    /// and schedules a full redraw.
    pub fn change(&mut self, build: impl FnOnce(&mut Screen)) {
        self.push_screen(ScreenKind::Full, build);
    }

    /// Pushes a modal sub-window over `region`. While it is on top, touch
    /// outside the region is discarded.
    pub fn open_aperture(&mut self, region: Rectangle, build: impl FnOnce(&mut Screen)) {
        self.push_screen(ScreenKind::Aperture(region), build);
    }

    fn push_screen(&mut self, kind: ScreenKind, build: impl FnOnce(&mut Screen)) {
        let id = ScreenId(self.next_screen);
        self.next_screen += 1;
        let mut screen = Screen::new(id, kind);
        build(&mut screen);

        self.capture = None;
        let previous = self.screens.last().map(|s| s.id());
        self.screens.push(screen);
        debug!("screen {:?} pushed, depth {}", id, self.screens.len());
        if let Some(previous) = previous {
            self.run_screen_hook(previous, false);
        }
        self.run_screen_hook(id, true);
        self.full_redraw = true;
    }

    /// Pops the top screen and restores the one beneath it. The root screen
    /// is never popped; calling `back` on it is a silent no-op.
    pub fn back(&mut self) {
        if self.screens.len() <= 1 {
            return;
        }
        self.capture = None;
        let mut popped = self.screens.pop().unwrap();
        debug!("screen {:?} popped, depth {}", popped.id(), self.screens.len());
        if let Some(mut hook) = popped.hide_hook.take() {
            hook(self);
        }
        // Result must be readable from the restored screen's open hook
        self.modal_result = popped.result.take();
        if let Some(restored) = self.screens.last().map(|s| s.id()) {
            self.run_screen_hook(restored, true);
        }
        self.full_redraw = true;
    }

    fn run_screen_hook(&mut self, id: ScreenId, open: bool) {
        let hook = self.screen_mut(id).and_then(|s| {
            if open {
                s.open_hook.take()
            } else {
                s.hide_hook.take()
            }
        });
        if let Some(mut hook) = hook {
            hook(self);
            if let Some(s) = self.screen_mut(id) {
                let slot = if open {
                    &mut s.open_hook
                } else {
                    &mut s.hide_hook
                };
                if slot.is_none() {
                    *slot = Some(hook);
                }
            }
        }
    }

    /// The active screen: top of the stack.
    pub fn current_screen(&self) -> Option<&Screen> {
        self.screens.last()
    }

    pub fn depth(&self) -> usize {
        self.screens.len()
    }

    /// Sets the result the active (modal) screen hands back when popped.
    pub fn set_result(&mut self, value: Value) {
        if let Some(top) = self.screens.last_mut() {
            top.set_result(value);
        }
    }

    /// Result left behind by the most recently popped screen, if any.
    pub fn modal_result(&self) -> Option<Value> {
        self.modal_result
    }

    /// Forces a full repaint of the active screen on the next draw.
    pub fn request_redraw(&mut self) {
        self.full_redraw = true;
    }

    fn screen_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.screens.iter_mut().find(|s| s.id() == id)
    }

    fn screen_ref(&self, id: ScreenId) -> Option<&Screen> {
        self.screens.iter().find(|s| s.id() == id)
    }

    pub(crate) fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.screen_ref(id.screen)?.widget(id.index)
    }

    pub(crate) fn widget_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.screen_mut(id.screen)?.widget_mut(id.index)
    }

    // ========================================================================
    // Value accessors
    // ========================================================================
    //
    // These are the only mutation paths, for touch and background logic
    // alike: every write clamps or validates, marks the control dirty and
    // fires its bound callback. Reads never mutate and never fire.

    /// Current logical value of a widget; `None` for value-less widgets and
    /// for stale ids whose screen has been popped.
    pub fn value(&self, id: WidgetId) -> Option<Value> {
        self.widget(id)?.value()
    }

    /// Writes an analog value, clamped into [0, 1]. Touch input legitimately
    /// overshoots, so out-of-range is not an error. Fires the move-class
    /// callback when the stored value changes.
    pub fn set_analog(&mut self, id: WidgetId, value: f32) {
        let value = value.clamp(0.0, 1.0);
        let changed = {
            let Some(w) = self.widget_mut(id) else { return };
            let changed = match w {
                Widget::Slider(s) => update_f32(&mut s.value, value),
                Widget::HorizSlider(s) => update_f32(&mut s.value, value),
                Widget::Knob(k) => update_f32(&mut k.value, value),
                Widget::Meter(m) => update_f32(&mut m.value, value),
                Widget::IconGauge(g) => {
                    let count = g.icons.count.max(1);
                    let state = ((value * count as f32) as usize).min(count - 1);
                    let changed = g.value != value || g.state != state;
                    g.value = value;
                    g.state = state;
                    changed
                }
                _ => return,
            };
            if changed {
                w.core_mut().dirty = true;
            }
            changed
        };
        if changed {
            self.fire(id, HookSlot::Change);
        }
    }

    /// Writes an on/off value; fires the change callback on transitions.
    pub fn set_switch(&mut self, id: WidgetId, on: bool) {
        let changed = {
            let Some(w) = self.widget_mut(id) else { return };
            let changed = match w {
                Widget::Checkbox(c) => {
                    let changed = c.checked != on;
                    c.checked = on;
                    changed
                }
                Widget::Led(l) => {
                    let changed = l.on != on;
                    l.on = on;
                    changed
                }
                _ => return,
            };
            if changed {
                w.core_mut().dirty = true;
            }
            changed
        };
        if changed {
            self.fire(id, HookSlot::Change);
        }
    }

    /// Writes a discrete selection. An out-of-range index is always a caller
    /// bug, never noisy input, so it is rejected and the state left
    /// untouched. A stale id is a silent no-op (timer-race class).
    pub fn select(&mut self, id: WidgetId, index: usize) -> Result<(), UiError> {
        let group_changed = {
            let Some(w) = self.widget_mut(id) else {
                return Ok(());
            };
            let outcome = match w {
                Widget::Listbox(l) => checked_select(&mut l.selected, index, l.entries.len())?
                    .then_some(false),
                Widget::Dropdown(d) => checked_select(&mut d.selected, index, d.entries.len())?
                    .then_some(false),
                Widget::IconButton(b) => checked_select(&mut b.state, index, b.icons.count)?
                    .then_some(false),
                Widget::IconGauge(g) => checked_select(&mut g.state, index, g.icons.count)?
                    .then_some(false),
                Widget::ButtonList(g) => {
                    if g.children.is_empty() {
                        return Err(UiError::EmptyGroup);
                    }
                    checked_select(&mut g.current, index, g.children.len())?.then_some(true)
                }
                Widget::RadioButtons(g) => {
                    if g.children.is_empty() {
                        return Err(UiError::EmptyGroup);
                    }
                    checked_select(&mut g.current, index, g.children.len())?.then_some(true)
                }
                Widget::IconRadioButtons(g) => {
                    if g.origins.is_empty() {
                        return Err(UiError::EmptyGroup);
                    }
                    checked_select(&mut g.current, index, g.origins.len())?.then_some(true)
                }
                _ => None,
            };
            if outcome.is_some() {
                w.core_mut().dirty = true;
            }
            outcome
        };
        match group_changed {
            Some(true) => self.fire_group(id, index),
            Some(false) => self.fire(id, HookSlot::Change),
            None => {}
        }
        Ok(())
    }

    /// Selects the entry matching `text`. A missing entry is a sentinel
    /// "no change" `None`, not an error, and leaves the selection untouched.
    pub fn select_text(&mut self, id: WidgetId, text: &str) -> Option<usize> {
        let index = match self.widget(id)? {
            Widget::Listbox(l) => l.entries.iter().position(|e| e == text),
            Widget::Dropdown(d) => d.entries.iter().position(|e| e == text),
            _ => None,
        }?;
        self.select(id, index).ok();
        Some(index)
    }

    /// Replaces a label's text.
    pub fn set_text(&mut self, id: WidgetId, text: &str) {
        let Some(Widget::Label(l)) = self.widget_mut(id) else {
            return;
        };
        if l.text.as_str() != text {
            l.text.clear();
            l.text.push_str(text).ok();
            l.core.dirty = true;
        }
    }

    /// Points one hand of a dial at `angle` radians (0 = vertical, clockwise
    /// positive). A pointer index beyond the configured count is a
    /// configuration error.
    pub fn set_dial(&mut self, id: WidgetId, pointer: usize, angle: f32) -> Result<(), UiError> {
        let Some(Widget::Dial(d)) = self.widget_mut(id) else {
            return Ok(());
        };
        let count = d.pointers.len();
        let hand = d
            .pointers
            .get_mut(pointer)
            .ok_or(UiError::PointerOutOfRange { pointer, count })?;
        hand.angle = Some(angle);
        d.core.dirty = true;
        Ok(())
    }

    /// Toggles disabled rendering; a greyed widget repaints with the
    /// process-wide grey style and stops matching hit-tests.
    pub fn set_greyed(&mut self, id: WidgetId, greyed: bool) {
        if let Some(w) = self.widget_mut(id) {
            if w.core().greyed != greyed {
                w.core_mut().greyed = greyed;
                w.core_mut().dirty = true;
            }
        }
    }

    pub fn is_greyed(&self, id: WidgetId) -> bool {
        self.widget(id).is_some_and(|w| w.core().greyed)
    }

    pub fn set_visible(&mut self, id: WidgetId, visible: bool) {
        if let Some(w) = self.widget_mut(id) {
            if w.core().visible != visible {
                w.core_mut().visible = visible;
                w.core_mut().dirty = true;
            }
        }
    }

    /// Runs a callback binding with exclusive access to the whole [`Ui`].
    ///
    /// The binding is detached for the duration of the call, so a re-entrant
    /// write to the same control cannot recurse into it; a callback that
    /// popped the owning screen simply loses the binding with the screen.
    fn fire(&mut self, id: WidgetId, slot: HookSlot) {
        let Some(mut hook) = self.widget_mut(id).and_then(|w| w.take_hook(slot)) else {
            return;
        };
        hook(self, id);
        if let Some(w) = self.widget_mut(id) {
            w.put_hook(slot, hook);
        }
    }

    fn fire_group(&mut self, id: WidgetId, child: usize) {
        let Some(mut hook) = self.widget_mut(id).and_then(|w| w.take_group_hook()) else {
            return;
        };
        hook(self, id, child);
        if let Some(w) = self.widget_mut(id) {
            w.put_group_hook(hook);
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// One full poll tick: filter the raw sample, dispatch at most one
    /// filtered event to completion, run the timers, repaint what changed.
    pub fn poll<S: Surface>(
        &mut self,
        sample: RawSample,
        now: Instant,
        surface: &mut S,
    ) -> Result<(), S::Error> {
        if let Some(event) = self.filter.feed(sample) {
            self.handle_event(event, now);
        }
        self.tick(now);
        self.draw(surface)
    }

    /// Injects an already-filtered touch event. Useful for alternative event
    /// sources; [`Ui::poll`] is the normal path.
    pub fn handle_event(&mut self, event: TouchEvent, now: Instant) {
        match event {
            TouchEvent::Down(p) => self.touch_start(p, now),
            TouchEvent::Move(p) => self.touch_move(p),
            TouchEvent::Up(p) => self.touch_end(p),
        }
    }

    fn touch_start(&mut self, p: TouchPoint, now: Instant) {
        let Some(top) = self.screens.last() else { return };
        if let ScreenKind::Aperture(region) = top.kind() {
            if !region.contains(p.to_point()) {
                debug!("touch {:?} outside modal region, discarded", p);
                return;
            }
        }
        let screen = top.id();
        // Descending order: the visually topmost control wins overlaps
        let index = top.widgets().iter().enumerate().rev().find_map(|(i, w)| {
            (w.is_control() && w.core().visible && !w.core().greyed && w.hit(p)).then_some(i)
        });
        let Some(index) = index else { return };
        let id = WidgetId {
            screen,
            index: index as u16,
        };
        self.capture = Some(Capture {
            id,
            start: now,
            long_fired: false,
        });
        self.deliver_press(id, p, now);
    }

    fn deliver_press(&mut self, id: WidgetId, p: TouchPoint, now: Instant) {
        let lit_time = self.style.lit_time;
        let press = {
            let Some(w) = self.widget_mut(id) else { return };
            match w {
                Widget::Button(b) => {
                    if b.lit_color.is_some() {
                        b.lit_until = Some(now + lit_time);
                        b.core.dirty = true;
                    }
                    Press::Nothing
                }
                Widget::Checkbox(c) => Press::Switch(!c.checked),
                Widget::IconButton(b) => {
                    if let Some(hold) = b.flash {
                        b.state = 1.min(b.icons.count - 1);
                        b.flash_until = Some(now + hold);
                        b.core.dirty = true;
                    } else if b.toggle {
                        b.state = (b.state + 1) % b.icons.count.max(1);
                        b.core.dirty = true;
                    }
                    Press::Fire
                }
                Widget::Slider(s) => Press::Analog(s.ratio_at(p)),
                Widget::HorizSlider(s) => Press::Analog(s.ratio_at(p)),
                Widget::Knob(k) => k.ratio_at(p).map_or(Press::Nothing, Press::Analog),
                Widget::Listbox(l) => l.row_at(p).map_or(Press::Nothing, Press::ListRow),
                Widget::Dropdown(d) => {
                    if d.entries.is_empty() {
                        Press::Nothing
                    } else {
                        Press::OpenDropdown
                    }
                }
                Widget::ButtonList(g) => {
                    if g.children.is_empty() {
                        Press::Nothing
                    } else {
                        // Pressing the (only visible) current button shows
                        // the next one
                        Press::Select((g.current + 1) % g.children.len())
                    }
                }
                Widget::RadioButtons(g) => {
                    g.child_at(p).map_or(Press::Nothing, Press::Select)
                }
                Widget::IconRadioButtons(g) => {
                    g.child_at(p).map_or(Press::Nothing, Press::Select)
                }
                _ => Press::Nothing,
            }
        };
        match press {
            Press::Nothing => {}
            Press::Fire => self.fire(id, HookSlot::Change),
            Press::Analog(v) => self.set_analog(id, v),
            Press::Switch(v) => self.set_switch(id, v),
            Press::Select(i) => {
                // In range by construction
                self.select(id, i).ok();
            }
            Press::ListRow(i) => {
                let previous = self.value(id).and_then(|v| v.as_index());
                self.select(id, i).ok();
                if previous == Some(i) {
                    // A tap on the current row still reports the selection
                    self.fire(id, HookSlot::Change);
                }
            }
            Press::OpenDropdown => self.open_dropdown(id),
        }
    }

    /// Opens the modal entry pane of a dropdown. Picking an entry routes the
    /// index back through [`Ui::select`] on the dropdown and closes the pane.
    fn open_dropdown(&mut self, id: WidgetId) {
        let Some(Widget::Dropdown(d)) = self.widget(id) else { return };
        let entries = d.entries.clone();
        let selected = d.selected;
        let bounds = d.core.bounds;

        let height = entries.len() as u32 * ROW_HEIGHT;
        let mut top = bounds.top_left.y + bounds.size.height as i32;
        let overflow = top + height as i32 - self.display_size.height as i32;
        if overflow > 0 {
            // Keep the pane on the display
            top = (top - overflow).max(0);
        }
        let region = Rectangle::new(
            Point::new(bounds.top_left.x, top),
            Size::new(bounds.size.width, height),
        );

        let dropdown = id;
        self.open_aperture(region, move |s| {
            s.add(
                Listbox::from_entries(region.top_left, region.size.width, entries)
                    .with_selected(selected)
                    .on_select(move |ui, list| {
                        if let Some(Value::Index(i)) = ui.value(list) {
                            ui.select(dropdown, i).ok();
                        }
                        ui.back();
                    }),
            );
        });
    }

    fn touch_move(&mut self, p: TouchPoint) {
        let Some(cap) = self.capture else { return };
        let value = {
            let Some(w) = self.widget(cap.id) else { return };
            if w.core().greyed {
                // Disabled mid-gesture by background logic: suppress
                return;
            }
            match w {
                Widget::Slider(s) => Some(s.ratio_at(p)),
                Widget::HorizSlider(s) => Some(s.ratio_at(p)),
                Widget::Knob(k) => k.ratio_at(p),
                _ => None,
            }
        };
        if let Some(v) = value {
            self.set_analog(cap.id, v);
        }
    }

    fn touch_end(&mut self, _p: TouchPoint) {
        // Capture is cleared unconditionally, suppressed or not
        let Some(cap) = self.capture.take() else { return };
        let release = match self.widget(cap.id) {
            Some(w) if !w.core().greyed => match w {
                // Normal and long-press callbacks are mutually exclusive
                Widget::Button(_) => !cap.long_fired,
                Widget::Slider(_) | Widget::HorizSlider(_) | Widget::Knob(_) => true,
                _ => false,
            },
            _ => false,
        };
        if release {
            self.fire(cap.id, HookSlot::End);
        }
    }

    /// Deadline work: long-press detection on the captured control and timed
    /// visual reverts (button lit, icon flash). Reverts only ever touch the
    /// active screen; a deadline whose screen has been popped or hidden
    /// expires silently.
    pub fn tick(&mut self, now: Instant) {
        if let Some(cap) = self.capture {
            if !cap.long_fired {
                let crossed = match self.widget(cap.id) {
                    Some(Widget::Button(b)) if b.on_long.is_some() && !b.core.greyed => {
                        let threshold = b.long_press_after.unwrap_or(self.style.long_press_time);
                        now - cap.start >= threshold
                    }
                    _ => false,
                };
                if crossed {
                    if let Some(cap) = self.capture.as_mut() {
                        cap.long_fired = true;
                    }
                    self.fire(cap.id, HookSlot::LongPress);
                }
            }
        }

        let Some(top) = self.screens.last_mut() else { return };
        for w in top.widgets_mut() {
            match w {
                Widget::Button(b) => {
                    if b.lit_until.is_some_and(|t| now >= t) {
                        b.lit_until = None;
                        b.core.dirty = true;
                    }
                }
                Widget::IconButton(b) => {
                    if b.flash_until.is_some_and(|t| now >= t) {
                        b.flash_until = None;
                        b.state = 0;
                        b.core.dirty = true;
                    }
                }
                _ => {}
            }
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Repaints the active screen: everything after a screen change, only
    /// dirty widgets otherwise. Hidden screens are never painted; their
    /// pending dirty flags die with them or survive until they are restored.
    pub fn draw<S: Surface>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        if self.screens.is_empty() {
            return Ok(());
        }
        let style = self.style;
        let display = self.display_size;
        let full = self.full_redraw;
        self.full_redraw = false;

        let top = self.screens.last_mut().unwrap();
        if full {
            let region = top.region(display);
            surface.fill_rect(region, style.bg)?;
            if let ScreenKind::Aperture(region) = top.kind() {
                surface.draw_rect(region, style.fg)?;
            }
        }
        for w in top.widgets_mut() {
            if !(full || w.core().dirty) {
                continue;
            }
            if w.core().visible {
                w.draw(surface, &style)?;
            } else if !full {
                // Erase what the widget previously showed
                surface.fill_rect(w.core().bounds(), w.core().bg(&style))?;
            }
            w.core_mut().dirty = false;
        }
        Ok(())
    }
}

fn update_f32(slot: &mut f32, value: f32) -> bool {
    if *slot != value {
        *slot = value;
        true
    } else {
        false
    }
}

/// Shared index-write contract of all discrete controls: reject out-of-range,
/// report whether the stored index changed.
fn checked_select(slot: &mut usize, index: usize, len: usize) -> Result<bool, UiError> {
    if index >= len {
        warn!("index {} rejected, {} entries", index, len);
        return Err(UiError::IndexOutOfRange { index, len });
    }
    if *slot == index {
        Ok(false)
    } else {
        *slot = index;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Shape;
    use crate::surface::TextAnchor;
    use crate::widgets::{Button, Checkbox, Dropdown, Listbox, RadioButtons, Slider};
    use embedded_graphics::pixelcolor::Rgb888;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec as StdVec;

    /// Surface that swallows everything; for tests about state, not pixels.
    struct NullSurface;

    impl Surface for NullSurface {
        type Error = core::convert::Infallible;

        fn fill_rect(&mut self, _: Rectangle, _: Rgb888) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_rect(&mut self, _: Rectangle, _: Rgb888) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_clipped_rect(
            &mut self,
            _: Rectangle,
            _: Rgb888,
            _: bool,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_line(&mut self, _: Point, _: Point, _: Rgb888) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_circle(
            &mut self,
            _: Point,
            _: u32,
            _: Rgb888,
            _: bool,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_text(
            &mut self,
            _: Point,
            _: &str,
            _: Rgb888,
            _: TextAnchor,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn text_extent(&self, text: &str) -> Size {
            Size::new(6 * text.len() as u32, 10)
        }
    }

    /// Surface recording every filled rectangle, for redraw-region tests.
    struct RecordingSurface {
        fills: StdVec<Rectangle>,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self { fills: StdVec::new() }
        }
    }

    impl Surface for RecordingSurface {
        type Error = core::convert::Infallible;

        fn fill_rect(&mut self, area: Rectangle, _: Rgb888) -> Result<(), Self::Error> {
            self.fills.push(area);
            Ok(())
        }

        fn draw_rect(&mut self, _: Rectangle, _: Rgb888) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_clipped_rect(
            &mut self,
            _: Rectangle,
            _: Rgb888,
            _: bool,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_line(&mut self, _: Point, _: Point, _: Rgb888) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_circle(
            &mut self,
            _: Point,
            _: u32,
            _: Rgb888,
            _: bool,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn draw_text(
            &mut self,
            _: Point,
            _: &str,
            _: Rgb888,
            _: TextAnchor,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn text_extent(&self, text: &str) -> Size {
            Size::new(6 * text.len() as u32, 10)
        }
    }

    fn rect_within(inner: Rectangle, outer: Rectangle) -> bool {
        let ibr = inner.top_left + inner.size;
        let obr = outer.top_left + outer.size;
        inner.top_left.x >= outer.top_left.x
            && inner.top_left.y >= outer.top_left.y
            && ibr.x <= obr.x
            && ibr.y <= obr.y
    }

    fn ui() -> Ui {
        Ui::new(Size::new(320, 240), TouchConfig::default())
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn tp(x: u16, y: u16) -> TouchPoint {
        TouchPoint::new(x, y)
    }

    /// Down + Up tap at a point.
    fn tap(ui: &mut Ui, p: TouchPoint, ms: u64) {
        ui.handle_event(TouchEvent::Down(p), at(ms));
        ui.handle_event(TouchEvent::Up(p), at(ms + 50));
    }

    /// Counter shared with a callback.
    fn counter() -> (Rc<RefCell<u32>>, Rc<RefCell<u32>>) {
        let c = Rc::new(RefCell::new(0));
        (c.clone(), c)
    }

    const SLIDER_BOUNDS: Rectangle =
        Rectangle::new(Point::new(10, 20), Size::new(30, 100));

    fn slider_screen(ui: &mut Ui) -> WidgetId {
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Slider::new(SLIDER_BOUNDS)));
        });
        id.unwrap()
    }

    // ------------------------------------------------------------------
    // Screen stack
    // ------------------------------------------------------------------

    #[test]
    fn test_screen_stack_hook_order() {
        let log = Rc::new(RefCell::new(StdVec::new()));
        let mut ui = ui();

        let (a_open, a_hide) = (log.clone(), log.clone());
        ui.change(move |s| {
            s.on_open(move |_| a_open.borrow_mut().push("A.open"));
            s.on_hide(move |_| a_hide.borrow_mut().push("A.hide"));
        });
        let (b_open, b_hide) = (log.clone(), log.clone());
        ui.change(move |s| {
            s.on_open(move |_| b_open.borrow_mut().push("B.open"));
            s.on_hide(move |_| b_hide.borrow_mut().push("B.hide"));
        });
        ui.back();

        assert_eq!(
            *log.borrow(),
            vec!["A.open", "A.hide", "B.open", "B.hide", "A.open"]
        );
    }

    #[test]
    fn test_back_on_root_is_noop() {
        let mut ui = ui();
        ui.change(|_| {});
        ui.back();
        assert_eq!(ui.depth(), 1);
    }

    #[test]
    fn test_aperture_result_readable_on_restore() {
        let seen = Rc::new(RefCell::new(None));
        let mut ui = ui();
        let s2 = seen.clone();
        ui.change(move |s| {
            let s2 = s2.clone();
            s.on_open(move |ui| {
                *s2.borrow_mut() = ui.modal_result();
            });
        });
        ui.open_aperture(
            Rectangle::new(Point::new(60, 60), Size::new(120, 80)),
            |_| {},
        );
        ui.set_result(Value::Index(2));
        ui.back();
        assert_eq!(*seen.borrow(), Some(Value::Index(2)));
    }

    // ------------------------------------------------------------------
    // Value contract
    // ------------------------------------------------------------------

    #[test]
    fn test_analog_write_clamps_and_rereads_exactly() {
        let mut ui = ui();
        let id = slider_screen(&mut ui);
        ui.set_analog(id, 1.7);
        assert_eq!(ui.value(id), Some(Value::Analog(1.0)));
        // Idempotent on re-read
        assert_eq!(ui.value(id), Some(Value::Analog(1.0)));
        ui.set_analog(id, -0.3);
        assert_eq!(ui.value(id), Some(Value::Analog(0.0)));
    }

    #[test]
    fn test_move_callback_once_per_change() {
        let (count, c) = counter();
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Slider::new(SLIDER_BOUNDS).on_move(move |_, _| {
                *c.borrow_mut() += 1;
            })));
        });
        let id = id.unwrap();
        ui.set_analog(id, 0.4);
        assert_eq!(*count.borrow(), 1);
        // Unchanged value: read-back contract, no callback
        ui.set_analog(id, 0.4);
        assert_eq!(*count.borrow(), 1);
        ui.set_analog(id, 0.5);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_discrete_write_rejects_and_keeps_state() {
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Listbox::new(Point::new(10, 10), 80, &["a", "b", "c"])));
        });
        let id = id.unwrap();
        assert_eq!(
            ui.select(id, 5),
            Err(UiError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(ui.value(id), Some(Value::Index(0)));
    }

    #[test]
    fn test_select_text_sentinel_leaves_state() {
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Listbox::new(Point::new(10, 10), 80, &["a", "b", "c"])));
        });
        let id = id.unwrap();
        assert_eq!(ui.select_text(id, "missing"), None);
        assert_eq!(ui.value(id), Some(Value::Index(0)));
        assert_eq!(ui.select_text(id, "c"), Some(2));
        assert_eq!(ui.value(id), Some(Value::Index(2)));
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    #[test]
    fn test_capture_persists_outside_bounds() {
        let mut ui = ui();
        let id = slider_screen(&mut ui);
        // Bottom of slot = y 120; touch at y 110 -> 0.1
        ui.handle_event(TouchEvent::Down(tp(25, 110)), at(0));
        assert_eq!(ui.value(id), Some(Value::Analog(0.1)));
        // Finger slides far outside the bounding box: still tracked
        ui.handle_event(TouchEvent::Move(tp(200, 70)), at(40));
        assert_eq!(ui.value(id), Some(Value::Analog(0.5)));
        ui.handle_event(TouchEvent::Up(tp(200, 70)), at(80));
    }

    #[test]
    fn test_greyed_control_is_not_hit() {
        let (count, c) = counter();
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(
                Button::new(Rectangle::new(Point::new(0, 0), Size::new(50, 50)))
                    .on_release(move |_, _| *c.borrow_mut() += 1),
            ));
        });
        let id = id.unwrap();
        ui.set_greyed(id, true);
        tap(&mut ui, tp(25, 25), 0);
        assert_eq!(*count.borrow(), 0);
        ui.set_greyed(id, false);
        tap(&mut ui, tp(25, 25), 1000);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_disable_while_captured_suppresses_but_clears() {
        let (ends, e) = counter();
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Slider::new(SLIDER_BOUNDS).on_end(move |_, _| {
                *e.borrow_mut() += 1;
            })));
        });
        let id = id.unwrap();
        ui.handle_event(TouchEvent::Down(tp(25, 110)), at(0));
        assert_eq!(ui.value(id), Some(Value::Analog(0.1)));
        // Background logic disables the control mid-gesture
        ui.set_greyed(id, true);
        ui.handle_event(TouchEvent::Move(tp(25, 70)), at(40));
        assert_eq!(ui.value(id), Some(Value::Analog(0.1)));
        ui.handle_event(TouchEvent::Up(tp(25, 70)), at(80));
        assert_eq!(*ends.borrow(), 0);
        // Capture was cleared on release: a later gesture starts clean
        ui.set_greyed(id, false);
        ui.handle_event(TouchEvent::Down(tp(25, 40)), at(200));
        ui.handle_event(TouchEvent::Up(tp(25, 40)), at(240));
        assert_eq!(*ends.borrow(), 1);
    }

    #[test]
    fn test_topmost_widget_wins_overlap() {
        let (count, c) = counter();
        let mut ui = ui();
        let bounds = Rectangle::new(Point::new(0, 0), Size::new(50, 50));
        let mut top = None;
        ui.change(|s| {
            s.add(Button::new(bounds));
            // Appended later = drawn on top = hit first
            top = Some(s.add(Button::new(bounds).on_release(move |_, _| {
                *c.borrow_mut() += 1;
            })));
        });
        tap(&mut ui, tp(25, 25), 0);
        assert_eq!(*count.borrow(), 1);
        let _ = top;
    }

    // ------------------------------------------------------------------
    // Long press
    // ------------------------------------------------------------------

    fn long_press_button(ui: &mut Ui) -> (WidgetId, Rc<RefCell<u32>>, Rc<RefCell<u32>>) {
        let released = Rc::new(RefCell::new(0));
        let long = Rc::new(RefCell::new(0));
        let (r, l) = (released.clone(), long.clone());
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(
                Button::new(Rectangle::new(Point::new(0, 0), Size::new(50, 50)))
                    .on_release(move |_, _| *r.borrow_mut() += 1)
                    .on_long_press(move |_, _| *l.borrow_mut() += 1),
            ));
        });
        (id.unwrap(), released, long)
    }

    #[test]
    fn test_release_before_threshold_fires_normal_only() {
        let mut ui = ui();
        let (_, released, long) = long_press_button(&mut ui);
        ui.handle_event(TouchEvent::Down(tp(25, 25)), at(0));
        ui.tick(at(900));
        ui.handle_event(TouchEvent::Up(tp(25, 25)), at(900));
        assert_eq!(*released.borrow(), 1);
        assert_eq!(*long.borrow(), 0);
    }

    #[test]
    fn test_long_press_suppresses_normal() {
        let mut ui = ui();
        let (_, released, long) = long_press_button(&mut ui);
        ui.handle_event(TouchEvent::Down(tp(25, 25)), at(0));
        ui.tick(at(1200));
        assert_eq!(*long.borrow(), 1);
        ui.handle_event(TouchEvent::Up(tp(25, 25)), at(1250));
        assert_eq!(*released.borrow(), 0);
        // Threshold crossed once, fired once
        ui.tick(at(2000));
        assert_eq!(*long.borrow(), 1);
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    #[test]
    fn test_radio_group_fires_once_per_change() {
        let count = Rc::new(RefCell::new(0));
        let last = Rc::new(RefCell::new(None));
        let (c, l) = (count.clone(), last.clone());
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            let mut group = RadioButtons::new(crate::color::BLUE);
            for i in 0..3 {
                group = group.with_button(
                    Rectangle::new(Point::new(i * 50, 0), Size::new(40, 40)),
                    "x",
                    Shape::Rectangle,
                );
            }
            id = Some(s.add(group.on_select(move |_, _, child| {
                *c.borrow_mut() += 1;
                *l.borrow_mut() = Some(child);
            })));
        });
        let id = id.unwrap();
        // Press child 2 (non-current)
        tap(&mut ui, tp(110, 20), 0);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(*last.borrow(), Some(2));
        assert_eq!(ui.value(id), Some(Value::Index(2)));
        // Press the already-current child: zero callbacks
        tap(&mut ui, tp(110, 20), 500);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_button_list_cycles() {
        let seen = Rc::new(RefCell::new(StdVec::new()));
        let s2 = seen.clone();
        let mut ui = ui();
        let bounds = Rectangle::new(Point::new(0, 0), Size::new(60, 30));
        let mut id = None;
        ui.change(|s| {
            id = Some(
                s.add(
                    crate::widgets::ButtonList::new()
                        .with_button(bounds, "Start", Shape::ClippedRect)
                        .with_button(bounds, "Stop", Shape::ClippedRect)
                        .on_select(move |_, _, child| s2.borrow_mut().push(child)),
                ),
            );
        });
        let id = id.unwrap();
        tap(&mut ui, tp(30, 15), 0);
        tap(&mut ui, tp(30, 15), 500);
        assert_eq!(*seen.borrow(), vec![1, 0]);
        assert_eq!(ui.value(id), Some(Value::Index(0)));
    }

    // ------------------------------------------------------------------
    // Modal apertures and dropdowns
    // ------------------------------------------------------------------

    #[test]
    fn test_aperture_discards_outside_touches() {
        let (count, c) = counter();
        let (modal_count, m) = counter();
        let mut ui = ui();
        ui.change(move |s| {
            s.add(
                Checkbox::new(Rectangle::new(Point::new(10, 10), Size::new(30, 30)))
                    .on_change(move |_, _| *c.borrow_mut() += 1),
            );
        });
        ui.open_aperture(
            Rectangle::new(Point::new(100, 100), Size::new(120, 80)),
            move |s| {
                s.add(
                    Button::new(Rectangle::new(Point::new(110, 110), Size::new(40, 30)))
                        .on_release(move |_, _| *m.borrow_mut() += 1),
                );
            },
        );
        // Outside the modal region: discarded, does not reach the checkbox
        tap(&mut ui, tp(15, 15), 0);
        assert_eq!(*count.borrow(), 0);
        // Inside: delivered to the modal's own widgets
        tap(&mut ui, tp(125, 120), 500);
        assert_eq!(*modal_count.borrow(), 1);
    }

    #[test]
    fn test_dropdown_opens_modal_and_selects() {
        let (count, c) = counter();
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(
                Dropdown::new(
                    Rectangle::new(Point::new(10, 10), Size::new(80, 14)),
                    &["red", "green", "blue"],
                )
                .on_select(move |_, _| *c.borrow_mut() += 1),
            ));
        });
        let id = id.unwrap();

        tap(&mut ui, tp(15, 15), 0);
        assert_eq!(ui.depth(), 2);
        assert!(ui.current_screen().unwrap().is_modal());

        // Entry pane starts below the collapsed box (y 24); row 1 = "green"
        tap(&mut ui, tp(15, 24 + 14 + 2), 500);
        assert_eq!(ui.depth(), 1);
        assert_eq!(ui.value(id), Some(Value::Index(1)));
        assert_eq!(*count.borrow(), 1);
    }

    // ------------------------------------------------------------------
    // Full pipeline and rendering
    // ------------------------------------------------------------------

    #[test]
    fn test_poll_pipeline_checkbox_toggle() {
        let (count, c) = counter();
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(
                Checkbox::new(Rectangle::new(Point::new(50, 50), Size::new(30, 30)))
                    .on_change(move |_, _| *c.borrow_mut() += 1),
            ));
        });
        let id = id.unwrap();
        let mut surface = NullSurface;
        // Three agreeing samples stabilize into a Down on the checkbox
        for i in 0..3 {
            ui.poll(RawSample::pressed(60, 60), at(i * 16), &mut surface)
                .unwrap();
        }
        ui.poll(RawSample::released(), at(64), &mut surface).unwrap();
        assert_eq!(ui.value(id), Some(Value::Switch(true)));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_value_write_repaints_only_that_control() {
        let mut ui = ui();
        let id = slider_screen(&mut ui);
        let mut surface = RecordingSurface::new();
        // Settle the initial full redraw
        ui.draw(&mut surface).unwrap();
        surface.fills.clear();

        ui.set_analog(id, 0.5);
        ui.draw(&mut surface).unwrap();
        assert!(!surface.fills.is_empty());
        for area in &surface.fills {
            assert!(
                rect_within(*area, SLIDER_BOUNDS),
                "fill {area:?} escapes the control region"
            );
        }
    }

    #[test]
    fn test_stale_timer_after_pop_is_silent() {
        let mut ui = ui();
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(
                Button::new(Rectangle::new(Point::new(0, 0), Size::new(50, 50)))
                    .with_lit_color(crate::color::YELLOW),
            ));
        });
        // Press lights the button, then the screen goes away before revert
        ui.handle_event(TouchEvent::Down(tp(25, 25)), at(0));
        ui.change(|_| {});
        ui.tick(at(5000));
        let mut surface = NullSurface;
        ui.draw(&mut surface).unwrap();
        let _ = id;
    }
}
