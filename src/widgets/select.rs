// src/widgets/select.rs
//! Selection controls: listbox and dropdown
//!
//! Both hold an index into an entry list. Index writes out of range are
//! rejected ([`crate::UiError::IndexOutOfRange`]); lookups by text that find
//! nothing leave the selection untouched and return `None`.

use alloc::string::String;
use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::engine::Ui;
use crate::style::StyleConfig;
use crate::surface::{Surface, TextAnchor};
use crate::types::{Hook, TouchPoint, WidgetId};
use crate::widgets::{Styled, WidgetCore};

/// Height of one entry row: font height plus padding.
pub(crate) const ROW_HEIGHT: u32 = 14;

// ============================================================================
// Listbox
// ============================================================================

/// Vertical list of entries; touching a row selects it.
///
/// A row tap always fires the selection callback, even on the current row
/// (a dropdown pane relies on this to close). Programmatic writes through
/// [`Ui::select`] fire only on an actual change.
pub struct Listbox {
    pub(crate) core: WidgetCore,
    pub(crate) entries: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) on_select: Option<Hook>,
}

impl Listbox {
    pub fn new(top_left: Point, width: u32, entries: &[&str]) -> Self {
        Self::from_entries(
            top_left,
            width,
            entries.iter().map(|e| String::from(*e)).collect(),
        )
    }

    pub(crate) fn from_entries(top_left: Point, width: u32, entries: Vec<String>) -> Self {
        let height = (entries.len() as u32 * ROW_HEIGHT).max(ROW_HEIGHT);
        Self {
            core: WidgetCore::new(Rectangle::new(top_left, Size::new(width, height))),
            entries,
            selected: 0,
            on_select: None,
        }
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        if selected < self.entries.len() {
            self.selected = selected;
        }
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_select = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry row under a touch coordinate.
    pub(crate) fn row_at(&self, p: TouchPoint) -> Option<usize> {
        let b = self.core.bounds;
        let dy = p.y as i32 - b.top_left.y;
        if dy < 0 {
            return None;
        }
        let row = (dy / ROW_HEIGHT as i32) as usize;
        (row < self.entries.len()).then_some(row)
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        let bg = self.core.bg(style);
        s.fill_rect(b, bg)?;
        for (i, entry) in self.entries.iter().enumerate() {
            let row = Rectangle::new(
                Point::new(b.top_left.x, b.top_left.y + (i as u32 * ROW_HEIGHT) as i32),
                Size::new(b.size.width, ROW_HEIGHT),
            );
            let text_color = if i == self.selected {
                s.fill_rect(row, fg)?;
                bg
            } else {
                self.core.font(style)
            };
            let at = Point::new(row.top_left.x + 3, row.top_left.y + ROW_HEIGHT as i32 / 2);
            s.draw_text(at, entry, text_color, TextAnchor::CenterLeft)?;
        }
        s.draw_rect(b, fg)
    }
}

impl Styled for Listbox {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

// ============================================================================
// Dropdown
// ============================================================================

/// Collapsed selector showing the current entry.
///
/// A press opens a modal aperture holding a listbox with the same entries;
/// picking an entry closes the modal, updates the selection and fires the
/// dropdown's callback.
pub struct Dropdown {
    pub(crate) core: WidgetCore,
    pub(crate) entries: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) on_select: Option<Hook>,
}

impl Dropdown {
    pub fn new(bounds: Rectangle, entries: &[&str]) -> Self {
        Self {
            core: WidgetCore::new(bounds),
            entries: entries.iter().map(|e| String::from(*e)).collect(),
            selected: 0,
            on_select: None,
        }
    }

    pub fn with_selected(mut self, selected: usize) -> Self {
        if selected < self.entries.len() {
            self.selected = selected;
        }
        self
    }

    pub fn on_select(mut self, hook: impl FnMut(&mut Ui, WidgetId) + 'static) -> Self {
        self.on_select = Some(alloc::boxed::Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn draw<S: Surface>(&self, s: &mut S, style: &StyleConfig) -> Result<(), S::Error> {
        let b = self.core.bounds;
        let fg = self.core.fg(style);
        s.fill_rect(b, self.core.bg(style))?;
        s.draw_rect(b, fg)?;
        if let Some(entry) = self.entries.get(self.selected) {
            let at = Point::new(b.top_left.x + 3, b.top_left.y + b.size.height as i32 / 2);
            s.draw_text(at, entry, self.core.font(style), TextAnchor::CenterLeft)?;
        }
        // Open indicator on the right edge
        let cy = b.top_left.y + b.size.height as i32 / 2;
        let x1 = b.top_left.x + b.size.width as i32;
        let tip = Point::new(x1 - 7, cy + 3);
        s.draw_line(Point::new(x1 - 11, cy - 3), tip, fg)?;
        s.draw_line(tip, Point::new(x1 - 3, cy - 3), fg)
    }
}

impl Styled for Dropdown {
    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_at_maps_rows_and_rejects_outside() {
        let lb = Listbox::new(Point::new(10, 20), 80, &["a", "b", "c"]);
        assert_eq!(lb.row_at(TouchPoint::new(12, 21)), Some(0));
        assert_eq!(lb.row_at(TouchPoint::new(12, 20 + ROW_HEIGHT as u16 + 1)), Some(1));
        assert_eq!(
            lb.row_at(TouchPoint::new(12, 20 + 2 * ROW_HEIGHT as u16 + 1)),
            Some(2)
        );
        assert_eq!(lb.row_at(TouchPoint::new(12, 19)), None);
        assert_eq!(
            lb.row_at(TouchPoint::new(12, 20 + 3 * ROW_HEIGHT as u16 + 1)),
            None
        );
    }
}
