// src/error.rs
//! Error taxonomy for the interaction engine
//!
//! Only programmer mistakes surface as errors: invalid configuration and
//! out-of-range indices on discrete controls. Noisy analog input is clamped,
//! failed text lookups return a sentinel, and timer races after a screen pop
//! are silent no-ops.

use thiserror_no_std::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum UiError {
    /// Grey-style division factor must exceed 1; anything else would brighten
    /// or keep disabled controls indistinguishable from enabled ones.
    #[error("grey style factor must be greater than 1, got {0}")]
    InvalidGreyFactor(f32),

    /// Discrete controls reject out-of-range indices instead of clamping.
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// Pointer index beyond a dial's configured pointer count.
    #[error("pointer {pointer} out of range for dial with {count} pointers")]
    PointerOutOfRange { pointer: usize, count: usize },

    /// Icon state beyond the icon set handed to the widget.
    #[error("icon state {state} out of range for icon set of {count}")]
    IconStateOutOfRange { state: usize, count: usize },

    /// Flashing icon buttons need a pressed frame in addition to frame 0.
    #[error("flashing icon button needs an icon set with at least 2 frames")]
    FlashNeedsTwoFrames,

    /// Group operation on a group without children.
    #[error("group has no child buttons")]
    EmptyGroup,
}
