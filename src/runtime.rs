// src/runtime.rs
//! Cooperative runtime glue
//!
//! The engine itself never blocks; this module wires it to a cooperative
//! scheduler. [`run`] is the recurring poll task (touch sample, dispatch,
//! timers, redraw - one tick at a time, yielding in between). Background
//! tasks never touch widget state directly: they enqueue [`UiRequest`]s,
//! which the poll task drains and applies through the public value
//! accessors, so redraws and callbacks stay consistent.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Instant, Ticker};
use heapless::String as HeaplessString;
use log::{error, info, warn};

use crate::engine::Ui;
use crate::surface::{Surface, TouchSource};
use crate::types::WidgetId;

/// Pending background requests; more than a handful per tick means the
/// producer is outrunning the poll rate.
pub const REQUEST_CAPACITY: usize = 8;

/// A mutation requested by a background task.
///
/// Each variant maps onto exactly one public [`Ui`] accessor; a request
/// whose widget's screen has been popped is a silent no-op, like any other
/// stale-id write.
pub enum UiRequest {
    SetAnalog(WidgetId, f32),
    SetSwitch(WidgetId, bool),
    Select(WidgetId, usize),
    SetText(WidgetId, HeaplessString<32>),
    SetGreyed(WidgetId, bool),
    SetVisible(WidgetId, bool),
    SetDial {
        id: WidgetId,
        pointer: usize,
        angle: f32,
    },
    /// Pop the top screen
    Back,
    /// Force a full repaint
    Redraw,
}

/// Global request channel between background tasks and the poll task.
pub static UI_CHANNEL: Channel<CriticalSectionRawMutex, UiRequest, REQUEST_CAPACITY> =
    Channel::new();

/// Sender half for background tasks.
pub fn ui_sender() -> Sender<'static, CriticalSectionRawMutex, UiRequest, REQUEST_CAPACITY> {
    UI_CHANNEL.sender()
}

/// Receiver half, for a custom poll loop instead of [`run`].
pub fn ui_receiver() -> Receiver<'static, CriticalSectionRawMutex, UiRequest, REQUEST_CAPACITY> {
    UI_CHANNEL.receiver()
}

impl Ui {
    /// Applies one background request through the public accessors.
    pub fn apply(&mut self, request: UiRequest) {
        match request {
            UiRequest::SetAnalog(id, value) => self.set_analog(id, value),
            UiRequest::SetSwitch(id, on) => self.set_switch(id, on),
            UiRequest::Select(id, index) => {
                if let Err(e) = self.select(id, index) {
                    warn!("background select rejected: {}", e);
                }
            }
            UiRequest::SetText(id, text) => self.set_text(id, &text),
            UiRequest::SetGreyed(id, greyed) => self.set_greyed(id, greyed),
            UiRequest::SetVisible(id, visible) => self.set_visible(id, visible),
            UiRequest::SetDial { id, pointer, angle } => {
                if let Err(e) = self.set_dial(id, pointer, angle) {
                    warn!("background dial update rejected: {}", e);
                }
            }
            UiRequest::Back => self.back(),
            UiRequest::Redraw => self.request_redraw(),
        }
    }
}

/// The recurring poll task.
///
/// Drains pending background requests, then runs one engine tick per
/// interval. Each filtered touch event - callbacks included - completes
/// before the task yields, which is what gives callbacks exclusive access
/// to widget state.
pub async fn run<T, S>(mut ui: Ui, mut touch: T, mut surface: S, poll_interval: Duration) -> !
where
    T: TouchSource,
    S: Surface,
{
    info!("ui poll task started, interval {:?}", poll_interval);
    let mut ticker = Ticker::every(poll_interval);
    loop {
        while let Ok(request) = UI_CHANNEL.try_receive() {
            ui.apply(request);
        }
        let sample = touch.sample();
        if let Err(e) = ui.poll(sample, Instant::now(), &mut surface) {
            error!("surface error: {:?}", e);
        }
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::TouchConfig;
    use crate::types::Value;
    use crate::widgets::Slider;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::Rectangle;

    #[test]
    fn test_requests_flow_through_accessors() {
        let mut ui = Ui::new(Size::new(320, 240), TouchConfig::default());
        let mut id = None;
        ui.change(|s| {
            id = Some(s.add(Slider::new(Rectangle::new(
                Point::new(10, 20),
                Size::new(30, 100),
            ))));
        });
        let id = id.unwrap();

        ui_sender()
            .try_send(UiRequest::SetAnalog(id, 2.5))
            .ok()
            .unwrap();
        ui_sender().try_send(UiRequest::SetGreyed(id, true)).ok().unwrap();
        while let Ok(request) = UI_CHANNEL.try_receive() {
            ui.apply(request);
        }

        // Background writes share the touch path's contract: clamped, greyed
        assert_eq!(ui.value(id), Some(Value::Analog(1.0)));
        assert!(ui.is_greyed(id));
    }
}
