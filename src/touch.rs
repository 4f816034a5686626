// src/touch.rs
//! Touch-sample filtering
//!
//! Resistive panels are electrically noisy: consecutive samples of a steady
//! finger can jump by tens of pixels. Without filtering, dispatch would
//! thrash between adjacent controls. [`TouchFilter`] turns the raw sample
//! stream into at most one clean event per poll.

use heapless::Deque;
use serde::{Deserialize, Serialize};

use crate::types::{TouchEvent, TouchPoint};

/// Hard cap on the rolling window; [`TouchConfig::window`] is clamped to it.
pub const MAX_WINDOW: usize = 8;

/// One raw sample from the touch panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
}

impl RawSample {
    pub fn pressed(x: u16, y: u16) -> Self {
        Self {
            x,
            y,
            pressed: true,
        }
    }

    pub fn released() -> Self {
        Self {
            x: 0,
            y: 0,
            pressed: false,
        }
    }
}

/// Per-panel filter calibration, loaded externally and injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchConfig {
    /// Minimum number of window samples that must agree for a stable point
    pub confidence: usize,
    /// Maximum per-axis deviation (pixels) for samples to count as agreeing
    pub margin: u16,
    /// Rolling window length; must be at least `confidence`
    pub window: usize,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            confidence: 3,
            margin: 5,
            window: 4,
        }
    }
}

/// Debounces the raw sample stream into `Down` / `Move` / `Up` events.
///
/// While pressed, the filter keeps the last `window` coordinates. A point is
/// *stable* when at least `confidence` of them agree within `margin` pixels
/// (Chebyshev distance from an anchor sample); the emitted coordinate is the
/// centroid of the agreeing cluster, which keeps a single outlier from
/// dragging the position by more than the margin. Gestures that never
/// stabilize produce no events at all.
pub struct TouchFilter {
    cfg: TouchConfig,
    window: Deque<TouchPoint, MAX_WINDOW>,
    /// Whether a `Down` has been emitted for the current gesture
    active: bool,
    last_stable: Option<TouchPoint>,
}

impl TouchFilter {
    pub fn new(cfg: TouchConfig) -> Self {
        let confidence = cfg.confidence.clamp(1, MAX_WINDOW);
        let cfg = TouchConfig {
            confidence,
            margin: cfg.margin,
            window: cfg.window.clamp(confidence, MAX_WINDOW),
        };
        Self {
            cfg,
            window: Deque::new(),
            active: false,
            last_stable: None,
        }
    }

    pub fn config(&self) -> TouchConfig {
        self.cfg
    }

    /// Consumes one raw sample; yields at most one filtered event.
    pub fn feed(&mut self, sample: RawSample) -> Option<TouchEvent> {
        if sample.pressed {
            if self.window.len() == self.cfg.window {
                self.window.pop_front();
            }
            // Capacity is MAX_WINDOW >= cfg.window, push cannot fail
            self.window
                .push_back(TouchPoint::new(sample.x, sample.y))
                .ok();

            let stable = self.stable_point()?;
            if !self.active {
                self.active = true;
                self.last_stable = Some(stable);
                return Some(TouchEvent::Down(stable));
            }
            if self.last_stable != Some(stable) {
                self.last_stable = Some(stable);
                return Some(TouchEvent::Move(stable));
            }
            None
        } else {
            self.window.clear();
            let was_active = self.active;
            self.active = false;
            let last = self.last_stable.take();
            if was_active {
                // last_stable is always set once active
                last.map(TouchEvent::Up)
            } else {
                None
            }
        }
    }

    /// Largest cluster of window samples agreeing within `margin`; `None`
    /// until `confidence` of them do.
    fn stable_point(&self) -> Option<TouchPoint> {
        if self.window.len() < self.cfg.confidence {
            return None;
        }
        let margin = self.cfg.margin;
        let mut best: Option<(usize, u32, u32)> = None;
        for anchor in self.window.iter() {
            let mut count = 0usize;
            let mut sum_x = 0u32;
            let mut sum_y = 0u32;
            for s in self.window.iter() {
                if s.x.abs_diff(anchor.x) <= margin && s.y.abs_diff(anchor.y) <= margin {
                    count += 1;
                    sum_x += s.x as u32;
                    sum_y += s.y as u32;
                }
            }
            if count >= self.cfg.confidence && best.is_none_or(|(c, _, _)| count > c) {
                best = Some((count, sum_x, sum_y));
            }
        }
        best.map(|(count, sum_x, sum_y)| {
            TouchPoint::new(
                (sum_x / count as u32) as u16,
                (sum_y / count as u32) as u16,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> TouchFilter {
        TouchFilter::new(TouchConfig::default())
    }

    #[test]
    fn test_down_waits_for_confidence() {
        let mut f = filter();
        assert_eq!(f.feed(RawSample::pressed(10, 10)), None);
        assert_eq!(f.feed(RawSample::pressed(11, 10)), None);
        let ev = f.feed(RawSample::pressed(10, 11));
        assert!(matches!(ev, Some(TouchEvent::Down(_))));
    }

    #[test]
    fn test_outlier_does_not_shift_centroid() {
        // confidence=3, margin=5, and one wild outlier in the window: it
        // must neither delay stability past the window nor pull the
        // centroid outside margin tolerance.
        let mut f = filter();
        assert_eq!(f.feed(RawSample::pressed(10, 10)), None);
        assert_eq!(f.feed(RawSample::pressed(12, 11)), None);
        assert_eq!(f.feed(RawSample::pressed(100, 100)), None);
        let ev = f.feed(RawSample::pressed(11, 9));
        let Some(TouchEvent::Down(p)) = ev else {
            panic!("expected stable down, got {ev:?}");
        };
        assert!(p.x.abs_diff(11) <= 5 && p.y.abs_diff(10) <= 5);
        assert_eq!(p, TouchPoint::new(11, 10));
    }

    #[test]
    fn test_up_carries_last_stable_point() {
        let mut f = filter();
        for _ in 0..3 {
            f.feed(RawSample::pressed(50, 60));
        }
        let up = f.feed(RawSample::released());
        assert_eq!(up, Some(TouchEvent::Up(TouchPoint::new(50, 60))));
    }

    #[test]
    fn test_unstable_gesture_is_discarded() {
        let mut f = filter();
        // Samples never agree: no Down, and therefore no Up either
        assert_eq!(f.feed(RawSample::pressed(10, 10)), None);
        assert_eq!(f.feed(RawSample::pressed(80, 10)), None);
        assert_eq!(f.feed(RawSample::pressed(10, 90)), None);
        assert_eq!(f.feed(RawSample::released()), None);
    }

    #[test]
    fn test_move_emitted_only_on_change() {
        let mut f = filter();
        for _ in 0..3 {
            f.feed(RawSample::pressed(50, 60));
        }
        // Same stable point: silent
        assert_eq!(f.feed(RawSample::pressed(50, 60)), None);
        // Finger slides: window drifts to a new centroid
        f.feed(RawSample::pressed(70, 60));
        f.feed(RawSample::pressed(70, 60));
        let ev = f.feed(RawSample::pressed(70, 60));
        assert!(matches!(ev, Some(TouchEvent::Move(_))));
    }
}
